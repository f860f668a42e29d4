mod table_tests;
mod image_tests;
