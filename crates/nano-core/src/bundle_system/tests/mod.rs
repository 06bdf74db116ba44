mod declaration_tests;
mod registry_tests;
