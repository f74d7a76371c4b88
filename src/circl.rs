/// CAPEC attack pattern records and fetchers.
pub mod capec;
/// NVD CPE records, fetchers and URI component extraction.
pub mod cpe;
/// CVE records and fetchers.
pub mod cve;
/// CWE weakness records and fetchers.
pub mod cwe;
pub mod normalize;
mod nullable;
pub mod results;
pub mod serviceclient;
pub mod timestamp;
