pub mod doaj;
