pub mod concurrent_reader;
pub mod observation_reader;
pub mod station_reader;

pub use concurrent_reader::{ConcurrentReader, InputData};
pub use observation_reader::{ColumnMapping, ObservationReader};
pub use station_reader::StationReader;
