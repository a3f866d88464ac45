pub mod shared_object;
