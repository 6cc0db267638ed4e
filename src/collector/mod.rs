//! NameNode JMX collection.
//!
//! `jmx` knows the shape of the JMX servlet document and pulls the
//! FSNamesystem attributes out of it; `namenode` owns the gauges and the
//! HTTP client and plugs both into a Prometheus registry.

pub mod jmx;
pub mod namenode;

pub use jmx::{BeanField, FS_NAMESYSTEM_BEAN, FsNamesystemReading, extract_fs_namesystem};
pub use namenode::{NAMESPACE, NameNodeCollector, ScrapeOutcome};
