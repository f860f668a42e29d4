mod test_utils;
mod parser_tests;
mod reader_tests;
