mod common;
mod http_tests;
