mod checker_tests;
