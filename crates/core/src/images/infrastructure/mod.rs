pub mod group_table_writer;
pub mod image_file_loader;
pub mod image_list_reader;
