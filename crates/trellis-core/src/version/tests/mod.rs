mod compare_tests;
mod constraint_tests;
