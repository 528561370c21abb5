mod progress_tests;
