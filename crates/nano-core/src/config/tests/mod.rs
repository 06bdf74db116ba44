mod data_tests;
mod loader_tests;
