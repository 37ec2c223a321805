use crate::grouping::domain::group_assigner::GroupId;

/// Receives one `(reference, group)` record per image, in input order.
pub trait GroupSink: Send {
    fn record(&mut self, reference: &str, group: GroupId) -> std::io::Result<()>;
}
