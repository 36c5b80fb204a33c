mod hierarchy_tests;
mod trace_tests;
