use crate::utils::error::Result;
use chrono::NaiveDate;

pub trait Storage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
    /// Location a relative report path ends up at, for user-facing messages.
    fn describe(&self, path: &str) -> String;
}

/// Run settings shared by the check pipelines.
pub trait ConfigProvider {
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    fn bundle(&self) -> bool;
    fn as_of(&self) -> NaiveDate;
}

pub trait Pipeline {
    type Extracted;
    type Output;

    fn extract(&self) -> Result<Self::Extracted>;
    fn transform(&self, data: Self::Extracted) -> Result<Self::Output>;
    /// Persists the output and returns the written locations.
    fn load(&self, output: &Self::Output) -> Result<Vec<String>>;
}
