pub mod changed_files;
