// Public options API

mod launch_options;

pub use launch_options::LaunchOptions;
