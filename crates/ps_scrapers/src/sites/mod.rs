pub mod popsci;
