/// A decoded image: contiguous bytes in row-major order, 1 (grey) or 3 (RGB)
/// channels.
///
/// Format conversion and rescaling happen in the loader; the grouping layer
/// only reads pixels. `index` is the image's position in the input list.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    /// Single-channel frame, mostly useful for building fixtures.
    pub fn gray(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self::new(data, width, height, 1, 0)
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_gray(&self) -> bool {
        self.channels == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2, 3, 5);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.index(), 5);
        assert_eq!(frame.data(), &data[..]);
        assert!(!frame.is_gray());
    }

    #[test]
    fn test_gray_constructor_and_index() {
        let frame = Frame::gray(vec![7u8; 6], 3, 2).with_index(4);
        assert!(frame.is_gray());
        assert_eq!(frame.index(), 4);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "data length must equal width * height * channels")]
    fn test_mismatched_data_length_panics_in_debug() {
        let data = vec![0u8; 10]; // wrong size for 2x2x3
        Frame::new(data, 2, 2, 3, 0);
    }
}
