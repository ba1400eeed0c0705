pub mod version_tests;
pub mod dependency_tests;
