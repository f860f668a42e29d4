mod test_utils;
mod parser_tests;
