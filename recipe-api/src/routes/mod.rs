/// API route handlers
///
/// Handlers are grouped by resource:
///
/// - `health`: Health check endpoint
/// - `users`: Account creation, tokens and the own profile
/// - `tags`, `ingredients`: Name-only entities owned by the caller
/// - `recipes`: Recipes with their tag and ingredient associations
/// - `admin`: Account listing and flags for staff

pub mod admin;
pub mod health;
pub mod ingredients;
pub mod recipes;
pub mod tags;
pub mod users;
