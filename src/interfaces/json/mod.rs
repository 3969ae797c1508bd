pub mod params_reader;
