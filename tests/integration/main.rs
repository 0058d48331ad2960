mod cache;
mod helpers;
mod session;
