//! The NameNode collector: fetches `/jmx`, updates the FSNamesystem gauges and
//! exposes them through the [`prometheus::core::Collector`] contract.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{Gauge, Opts};
use tracing::{debug, info, warn};

use super::jmx::{BeanField, FsNamesystemReading, extract_fs_namesystem};
use crate::config::NameNodeConfig;
use crate::error::{FieldError, ScrapeError, StartupError};
use crate::utils::log_throttle::LogThrottle;

/// Prefix of every metric exported by this collector.
pub const NAMESPACE: &str = "namenode";

const ABSENT_BEAN_EVENT: &str = "collector.bean.absent";
const ABSENT_BEAN_LOG_WINDOW: Duration = Duration::from_secs(300);

/// What a successful scrape did to the gauges.
#[derive(Debug, Clone, PartialEq)]
pub enum ScrapeOutcome {
    /// The FSNamesystem bean was found. `skipped` lists the attributes that
    /// could not be read; their gauges kept the previous value.
    Updated {
        updated: usize,
        skipped: Vec<FieldError>,
    },
    /// The document had no FSNamesystem bean; nothing was touched.
    BeanAbsent,
}

struct FsNamesystemGauges {
    missing_blocks: Gauge,
    capacity_total: Gauge,
    blocks_total: Gauge,
}

impl FsNamesystemGauges {
    fn new() -> Result<Self, prometheus::Error> {
        Ok(Self {
            missing_blocks: gauge(BeanField::MissingBlocks)?,
            capacity_total: gauge(BeanField::CapacityTotal)?,
            blocks_total: gauge(BeanField::BlocksTotal)?,
        })
    }

    fn get(&self, field: BeanField) -> &Gauge {
        match field {
            BeanField::MissingBlocks => &self.missing_blocks,
            BeanField::CapacityTotal => &self.capacity_total,
            BeanField::BlocksTotal => &self.blocks_total,
        }
    }
}

fn gauge(field: BeanField) -> Result<Gauge, prometheus::Error> {
    Gauge::with_opts(Opts::new(field.as_str(), field.as_str()).namespace(NAMESPACE))
}

/// Gauges behind the lock that keeps the triple consistent.
///
/// Writers of a reading and readers of the whole triple both go through
/// `gauges`, so a gather never mixes values from two different scrapes.
/// `descs` are copied out at construction because [`Collector::desc`] hands
/// out borrows that cannot outlive a guard.
struct GaugeState {
    gauges: Mutex<FsNamesystemGauges>,
    descs: Vec<Desc>,
}

impl GaugeState {
    fn new() -> Result<Self, prometheus::Error> {
        let gauges = FsNamesystemGauges::new()?;
        let descs = BeanField::ALL
            .into_iter()
            .flat_map(|field| gauges.get(field).desc())
            .cloned()
            .collect();
        Ok(Self {
            gauges: Mutex::new(gauges),
            descs,
        })
    }

    fn lock(&self) -> MutexGuard<'_, FsNamesystemGauges> {
        self.gauges.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Collector for the NameNode FSNamesystem bean.
///
/// Cloning is cheap and clones share the same gauges, which is how the same
/// instance is both registered with a [`prometheus::Registry`] and kept by the
/// scrape handler to trigger refreshes.
#[derive(Clone)]
pub struct NameNodeCollector {
    client: reqwest::Client,
    url: String,
    state: Arc<GaugeState>,
    throttle: Arc<LogThrottle>,
}

impl NameNodeCollector {
    /// Creates a collector with a client using the configured request timeout.
    pub fn new(config: &NameNodeConfig) -> Result<Self, StartupError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(StartupError::Client)?;
        Self::with_client(client, &config.jmx_url)
    }

    pub fn with_client(
        client: reqwest::Client,
        url: impl Into<String>,
    ) -> Result<Self, StartupError> {
        let url = url.into();
        info!("Creating NameNode collector for '{}'", url);
        Ok(Self {
            client,
            url,
            state: Arc::new(GaugeState::new()?),
            throttle: Arc::new(LogThrottle::new(ABSENT_BEAN_LOG_WINDOW)),
        })
    }

    /// Runs one fetch/parse/update cycle and logs its outcome.
    ///
    /// Never fails: errors leave the gauges at their previous values.
    pub async fn refresh(&self) {
        match self.scrape().await {
            Ok(ScrapeOutcome::Updated { updated, skipped }) => {
                self.throttle.reset(ABSENT_BEAN_EVENT);
                if skipped.is_empty() {
                    debug!(
                        event_name = "collector.scrape.updated",
                        event_domain = "collector",
                        updated,
                        "FSNamesystem gauges updated"
                    );
                } else {
                    let fields: Vec<&str> = skipped.iter().map(|e| e.field().as_str()).collect();
                    let reasons: Vec<String> = skipped.iter().map(ToString::to_string).collect();
                    warn!(
                        event_name = "collector.scrape.fields_skipped",
                        event_domain = "collector",
                        url = self.url.as_str(),
                        updated,
                        skipped_fields = fields.join(",").as_str(),
                        reasons = reasons.join("; ").as_str(),
                        "FSNamesystem bean has unreadable attributes, keeping previous values for them"
                    );
                }
            }
            Ok(ScrapeOutcome::BeanAbsent) => {
                if let Some(suppressed_count) = self.throttle.should_emit(ABSENT_BEAN_EVENT) {
                    info!(
                        event_name = ABSENT_BEAN_EVENT,
                        event_domain = "collector",
                        url = self.url.as_str(),
                        suppressed_count,
                        "JMX document has no FSNamesystem bean, keeping previous values"
                    );
                }
            }
            Err(e) => {
                warn!(
                    event_name = "collector.scrape.failed",
                    event_domain = "collector",
                    url = self.url.as_str(),
                    error_kind = e.kind(),
                    error = %e,
                    "NameNode scrape failed, keeping previous values"
                );
            }
        }
    }

    /// Fetches the JMX document and applies the FSNamesystem bean to the gauges.
    pub async fn scrape(&self) -> Result<ScrapeOutcome, ScrapeError> {
        let body = self.fetch().await?;
        match extract_fs_namesystem(&body)? {
            Some(reading) => {
                self.apply(&reading);
                Ok(ScrapeOutcome::Updated {
                    updated: reading.values.len(),
                    skipped: reading.errors,
                })
            }
            None => Ok(ScrapeOutcome::BeanAbsent),
        }
    }

    async fn fetch(&self) -> Result<String, ScrapeError> {
        let transport = |source: reqwest::Error| ScrapeError::Transport {
            url: self.url.clone(),
            source,
        };

        debug!("Sending NameNode JMX request to: {}", self.url);
        let response = self.client.get(&self.url).send().await.map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: self.url.clone(),
                status,
            });
        }

        response.text().await.map_err(transport)
    }

    /// Sets the gauges from a reading. Fields missing from the reading keep
    /// their current value.
    pub fn apply(&self, reading: &FsNamesystemReading) {
        let gauges = self.state.lock();
        for (field, value) in &reading.values {
            gauges.get(*field).set(*value);
        }
        debug!(bean = ?reading.values, "Applied FSNamesystem reading");
    }

    /// Current value of one gauge.
    pub fn value(&self, field: BeanField) -> f64 {
        self.state.lock().get(field).get()
    }

    /// Current values of all gauges, read atomically with respect to [`apply`].
    ///
    /// [`apply`]: NameNodeCollector::apply
    pub fn values(&self) -> [(BeanField, f64); 3] {
        let gauges = self.state.lock();
        BeanField::ALL.map(|field| (field, gauges.get(field).get()))
    }
}

impl Collector for NameNodeCollector {
    fn desc(&self) -> Vec<&Desc> {
        self.state.descs.iter().collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let gauges = self.state.lock();
        BeanField::ALL
            .into_iter()
            .flat_map(|field| gauges.get(field).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DocumentError;
    use mockito::Server;
    use std::thread;

    const SCENARIO_A: &str = r#"{"beans":[{"name":"Hadoop:service=NameNode,name=FSNamesystem","MissingBlocks":3,"CapacityTotal":1000.0,"BlocksTotal":50}]}"#;
    const SCENARIO_B: &str = r#"{"beans":[{"name":"java.lang:type=Other"}]}"#;

    fn collector(url: &str) -> NameNodeCollector {
        NameNodeCollector::new(&NameNodeConfig {
            jmx_url: url.to_string(),
            timeout_in_ms: 2000,
        })
        .expect("collector should build")
    }

    fn scenario_a_values() -> [(BeanField, f64); 3] {
        [
            (BeanField::MissingBlocks, 3.0),
            (BeanField::CapacityTotal, 1000.0),
            (BeanField::BlocksTotal, 50.0),
        ]
    }

    /// A URL nobody listens on.
    fn unreachable_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{}/jmx", port)
    }

    async fn jmx_server(body: &str) -> (mockito::ServerGuard, mockito::Mock) {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/jmx")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;
        (server, mock)
    }

    #[tokio::test]
    async fn scrape_sets_gauges_from_the_bean() {
        let (server, mock) = jmx_server(SCENARIO_A).await;
        let collector = collector(&format!("{}/jmx", server.url()));

        let outcome = collector.scrape().await.expect("scrape should succeed");

        mock.assert_async().await;
        assert_eq!(
            outcome,
            ScrapeOutcome::Updated {
                updated: 3,
                skipped: vec![]
            }
        );
        assert_eq!(collector.values(), scenario_a_values());
    }

    #[tokio::test]
    async fn absent_bean_leaves_gauges_at_zero() {
        let (server, _mock) = jmx_server(SCENARIO_B).await;
        let collector = collector(&format!("{}/jmx", server.url()));

        let outcome = collector.scrape().await.unwrap();

        assert_eq!(outcome, ScrapeOutcome::BeanAbsent);
        for (_, value) in collector.values() {
            assert_eq!(value, 0.0);
        }
    }

    #[tokio::test]
    async fn absent_bean_keeps_previous_values() {
        let (server, _mock) = jmx_server(SCENARIO_B).await;
        let collector = collector(&format!("{}/jmx", server.url()));
        collector.apply(&extract_fs_namesystem(SCENARIO_A).unwrap().unwrap());

        collector.refresh().await;

        assert_eq!(collector.values(), scenario_a_values());
    }

    #[tokio::test]
    async fn unreachable_source_keeps_previous_values() {
        let collector = collector(&unreachable_url());
        collector.apply(&extract_fs_namesystem(SCENARIO_A).unwrap().unwrap());

        let result = collector.scrape().await;
        assert!(matches!(result, Err(ScrapeError::Transport { .. })));

        collector.refresh().await;
        assert_eq!(collector.values(), scenario_a_values());
    }

    #[tokio::test]
    async fn error_status_keeps_previous_values() {
        let mut server = Server::new_async().await;
        let ok = server
            .mock("GET", "/jmx")
            .with_status(200)
            .with_body(SCENARIO_A)
            .expect(1)
            .create_async()
            .await;
        let collector = collector(&format!("{}/jmx", server.url()));
        collector.scrape().await.unwrap();
        ok.remove_async().await;

        server
            .mock("GET", "/jmx")
            .with_status(503)
            .with_body(SCENARIO_A.replace("\"MissingBlocks\":3", "\"MissingBlocks\":9"))
            .create_async()
            .await;

        let result = collector.scrape().await;
        assert!(matches!(
            result,
            Err(ScrapeError::Status { status, .. }) if status == reqwest::StatusCode::SERVICE_UNAVAILABLE
        ));
        assert_eq!(collector.values(), scenario_a_values());
    }

    #[tokio::test]
    async fn document_without_beans_is_an_error() {
        let (server, _mock) = jmx_server(r#"{"something":"else"}"#).await;
        let collector = collector(&format!("{}/jmx", server.url()));
        collector.apply(&extract_fs_namesystem(SCENARIO_A).unwrap().unwrap());

        let result = collector.scrape().await;

        assert!(matches!(
            result,
            Err(ScrapeError::Malformed(DocumentError::MissingBeans))
        ));
        assert_eq!(collector.values(), scenario_a_values());
    }

    #[tokio::test]
    async fn unreadable_field_only_skips_its_gauge() {
        let (server, _mock) = jmx_server(
            r#"{"beans":[{"name":"Hadoop:service=NameNode,name=FSNamesystem","MissingBlocks":null,"CapacityTotal":2048,"BlocksTotal":7}]}"#,
        )
        .await;
        let collector = collector(&format!("{}/jmx", server.url()));
        collector.apply(&extract_fs_namesystem(SCENARIO_A).unwrap().unwrap());

        let outcome = collector.scrape().await.unwrap();

        assert_eq!(
            outcome,
            ScrapeOutcome::Updated {
                updated: 2,
                skipped: vec![FieldError::NotNumeric {
                    field: BeanField::MissingBlocks,
                    found: "null"
                }],
            }
        );
        assert_eq!(collector.value(BeanField::MissingBlocks), 3.0);
        assert_eq!(collector.value(BeanField::CapacityTotal), 2048.0);
        assert_eq!(collector.value(BeanField::BlocksTotal), 7.0);
    }

    #[test]
    fn describes_three_namespaced_gauges() {
        let collector = collector("http://localhost:50070/jmx");
        let descs = collector.desc();
        let names: Vec<&str> = descs
            .iter()
            .map(|desc| desc.fq_name.as_str())
            .collect();

        assert_eq!(
            names,
            vec![
                "namenode_MissingBlocks",
                "namenode_CapacityTotal",
                "namenode_BlocksTotal"
            ]
        );
    }

    #[test]
    fn concurrent_updates_are_never_torn() {
        let collector = collector("http://localhost:50070/jmx");

        let writers: Vec<_> = (1..=4)
            .map(|n| {
                let collector = collector.clone();
                thread::spawn(move || {
                    for i in 0..500 {
                        let k = f64::from(n * 1000 + i);
                        collector.apply(&FsNamesystemReading {
                            values: vec![
                                (BeanField::MissingBlocks, k),
                                (BeanField::CapacityTotal, k * 10.0),
                                (BeanField::BlocksTotal, k * 100.0),
                            ],
                            errors: vec![],
                        });
                    }
                })
            })
            .collect();

        let reader = {
            let collector = collector.clone();
            thread::spawn(move || {
                for _ in 0..500 {
                    let families = Collector::collect(&collector);
                    let values: Vec<f64> = families
                        .iter()
                        .map(|family| family.get_metric()[0].get_gauge().get_value())
                        .collect();
                    assert_eq!(values.len(), 3);
                    assert_eq!(values[1], values[0] * 10.0);
                    assert_eq!(values[2], values[0] * 100.0);
                }
            })
        };

        for writer in writers {
            writer.join().unwrap();
        }
        reader.join().unwrap();
    }
}
