

mod unify_tests;

mod inference_tests;

mod solver_tests;

fn main() {}
