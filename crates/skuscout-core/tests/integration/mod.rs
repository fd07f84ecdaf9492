mod pipeline_tests;
mod scan_tests;
