pub mod user_analysis;
