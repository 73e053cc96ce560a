use super::regeneration::{self, RegenerationOptions};
use crate::{
    codec::Codec,
    config::OpenLrConfig,
    error::OpenLrError,
    model::{
        AccuracyReport, ClosureRecord, ClosureStore, EncodedReference, Format,
        ReferenceStatistics, RegenerationReport,
    },
    provider::WayGeometryProvider,
    roundtrip,
};
use geo::{Geometry, LineString};
use serde::{Deserialize, Serialize};
use std::sync::{atomic::AtomicBool, Arc, Mutex};

/// summary of the location referencing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinatorInfo {
    pub enabled: bool,
    /// the format new references are written in, absent when referencing is disabled
    pub format: Option<Format>,
    pub accuracy_tolerance: f64,
    pub supported_formats: Vec<Format>,
    pub way_provider_configured: bool,
    pub settings: OpenLrConfig,
}

/// a way geometry and the reference encoded from it.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedWay {
    pub way_id: i64,
    pub geometry: LineString<f64>,
    pub reference: EncodedReference,
}

/// entry point for closure management. keeps closure references in step with
/// closure geometries and exposes the codec under the configured settings.
pub struct ReferenceCoordinator {
    config: OpenLrConfig,
    codec: Codec,
    way_provider: Option<Arc<dyn WayGeometryProvider>>,
    regeneration_lock: Mutex<()>,
}

impl ReferenceCoordinator {
    pub fn new(config: OpenLrConfig) -> ReferenceCoordinator {
        let codec = Codec::from_config(&config);
        ReferenceCoordinator {
            config,
            codec,
            way_provider: None,
            regeneration_lock: Mutex::new(()),
        }
    }

    pub fn with_way_provider(mut self, provider: Arc<dyn WayGeometryProvider>) -> ReferenceCoordinator {
        self.way_provider = Some(provider);
        self
    }

    pub fn config(&self) -> &OpenLrConfig {
        &self.config
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    /// reference for a newly created closure. failures are logged and yield `None`.
    pub fn on_create(&self, geometry: &Geometry<f64>) -> Option<EncodedReference> {
        self.best_effort_encode(geometry, "create")
    }

    /// replacement reference after a closure's geometry changed. failures are
    /// logged and yield `None`.
    pub fn on_update(&self, new_geometry: &Geometry<f64>) -> Option<EncodedReference> {
        self.best_effort_encode(new_geometry, "update")
    }

    fn best_effort_encode(&self, geometry: &Geometry<f64>, event: &str) -> Option<EncodedReference> {
        match self.encode(geometry) {
            Ok(reference) => reference,
            Err(e) => {
                log::warn!("failed to encode OpenLR reference on closure {event}: {e}");
                None
            }
        }
    }

    /// encodes in the configured format, or returns `None` when referencing is disabled.
    pub fn encode(&self, geometry: &Geometry<f64>) -> Result<Option<EncodedReference>, OpenLrError> {
        if !self.config.enabled {
            return Ok(None);
        }
        self.codec.encode(geometry, self.config.format).map(Some)
    }

    pub fn encode_as(
        &self,
        geometry: &Geometry<f64>,
        format: Format,
    ) -> Result<Option<EncodedReference>, OpenLrError> {
        if !self.config.enabled {
            return Ok(None);
        }
        self.codec.encode(geometry, format).map(Some)
    }

    /// decodes a reference, or returns `None` when referencing is disabled.
    pub fn decode(&self, reference: &str) -> Result<Option<LineString<f64>>, OpenLrError> {
        if !self.config.enabled {
            return Ok(None);
        }
        self.codec.decode(reference).map(Some)
    }

    pub fn validate_code(&self, reference: &str) -> bool {
        self.config.enabled && self.codec.validate_code(reference)
    }

    /// round trip in the configured format against the configured tolerance.
    pub fn test_roundtrip(&self, geometry: &Geometry<f64>) -> AccuracyReport {
        roundtrip::test_roundtrip_as(
            &self.codec,
            self.config.format,
            geometry,
            self.config.accuracy_tolerance,
        )
    }

    /// scores a stored reference against the stored geometry of the same closure.
    pub fn validate(
        &self,
        stored_geometry: &Geometry<f64>,
        stored_reference: &EncodedReference,
        tolerance_meters: f64,
    ) -> AccuracyReport {
        roundtrip::score_reference(
            &self.codec,
            stored_reference.clone(),
            stored_geometry,
            tolerance_meters,
        )
    }

    /// regenerates references in chunks of the configured size. see
    /// [`ReferenceCoordinator::regenerate_batch_with`].
    pub fn regenerate_batch<S: ClosureStore + ?Sized>(
        &self,
        closures: &[ClosureRecord],
        force: bool,
        store: &mut S,
    ) -> RegenerationReport {
        let options = RegenerationOptions::new(force, self.config.regeneration_chunk_size);
        self.regenerate_batch_with(closures, &options, store, &AtomicBool::new(false))
    }

    /// regenerates references for every closure when `options.force` is set,
    /// otherwise for closures that lack one. a closure that cannot be encoded
    /// is recorded as a failure and does not stop the run. runs on the same
    /// coordinator take turns.
    pub fn regenerate_batch_with<S: ClosureStore + ?Sized>(
        &self,
        closures: &[ClosureRecord],
        options: &RegenerationOptions,
        store: &mut S,
        cancel: &AtomicBool,
    ) -> RegenerationReport {
        let _guard = match self.regeneration_lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if !self.config.enabled {
            return RegenerationReport {
                error: Some(String::from("OpenLR encoding is disabled")),
                ..Default::default()
            };
        }
        let targets = regeneration::select_targets(closures, options.force);
        log::info!(
            "regenerating OpenLR references for {} of {} closures (force={})",
            targets.len(),
            closures.len(),
            options.force
        );
        let report = regeneration::run(
            &self.codec,
            self.config.format,
            &targets,
            options,
            store,
            cancel,
        );
        log::info!(
            "OpenLR regeneration finished: {} processed, {} successful, {} failed",
            report.total_processed,
            report.successful,
            report.failed
        );
        report
    }

    /// geometry of a way from the configured provider.
    pub fn fetch_way_geometry(
        &self,
        way_id: i64,
        start_node: Option<i64>,
        end_node: Option<i64>,
    ) -> Result<LineString<f64>, OpenLrError> {
        let provider = self
            .way_provider
            .as_ref()
            .ok_or(OpenLrError::ProviderNotConfigured)?;
        provider.fetch(way_id, start_node, end_node)
    }

    /// fetches a way and encodes it in the configured format, or returns
    /// `None` without fetching when referencing is disabled.
    pub fn encode_way(
        &self,
        way_id: i64,
        start_node: Option<i64>,
        end_node: Option<i64>,
    ) -> Result<Option<EncodedWay>, OpenLrError> {
        if !self.config.enabled {
            return Ok(None);
        }
        let geometry = self.fetch_way_geometry(way_id, start_node, end_node)?;
        let reference = self
            .codec
            .encode(&Geometry::LineString(geometry.clone()), self.config.format)?;
        Ok(Some(EncodedWay {
            way_id,
            geometry,
            reference,
        }))
    }

    pub fn statistics(&self, closures: &[ClosureRecord]) -> ReferenceStatistics {
        ReferenceStatistics::from_closures(closures)
    }

    pub fn info(&self) -> CoordinatorInfo {
        CoordinatorInfo {
            enabled: self.config.enabled,
            format: self.config.enabled.then_some(self.config.format),
            accuracy_tolerance: self.config.accuracy_tolerance,
            supported_formats: Format::ALL.to_vec(),
            way_provider_configured: self.way_provider.is_some(),
            settings: self.config.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClosureId, MemoryClosureStore};
    use geo::{line_string, point};

    struct FixedWay(LineString<f64>);

    impl WayGeometryProvider for FixedWay {
        fn fetch(
            &self,
            way_id: i64,
            _start_node: Option<i64>,
            _end_node: Option<i64>,
        ) -> Result<LineString<f64>, OpenLrError> {
            if way_id == 1 {
                Ok(self.0.clone())
            } else {
                Err(OpenLrError::WayNotFound(way_id))
            }
        }
    }

    fn chicago() -> Geometry<f64> {
        Geometry::LineString(line_string![(x: -87.6298, y: 41.8781), (x: -87.6290, y: 41.8785)])
    }

    fn disabled() -> ReferenceCoordinator {
        ReferenceCoordinator::new(OpenLrConfig {
            enabled: false,
            ..Default::default()
        })
    }

    #[test]
    fn test_on_create_and_update() {
        let coordinator = ReferenceCoordinator::new(OpenLrConfig::default());
        let created = coordinator.on_create(&chicago()).unwrap();
        assert!(coordinator.validate_code(created.as_str()));
        assert!(coordinator.on_update(&Geometry::Point(point!(x: 1.0, y: 1.0))).is_none());
        assert!(coordinator.on_create(&Geometry::LineString(line_string![(x: 0.0, y: 0.0)])).is_none());
    }

    #[test]
    fn test_disabled_passthroughs() {
        let coordinator = disabled();
        assert!(coordinator.on_create(&chicago()).is_none());
        assert!(coordinator.encode(&chicago()).unwrap().is_none());
        assert!(coordinator.decode("QgA=").unwrap().is_none());
        assert!(!coordinator.validate_code("QgA="));
        assert!(coordinator.encode_way(1, None, None).unwrap().is_none());
        assert_eq!(coordinator.info().format, None);
    }

    #[test]
    fn test_configured_format() {
        let coordinator = ReferenceCoordinator::new(OpenLrConfig {
            format: Format::Xml,
            ..Default::default()
        });
        let code = coordinator.encode(&chicago()).unwrap().unwrap();
        assert!(code.as_str().contains("<OpenLR>"));
        let report = coordinator.test_roundtrip(&chicago());
        assert!(report.valid);
        assert_eq!(report.tolerance_meters, 50.0);
    }

    #[test]
    fn test_validate_stored_reference() {
        let coordinator = ReferenceCoordinator::new(OpenLrConfig::default());
        let code = coordinator.encode(&chicago()).unwrap().unwrap();
        let report = coordinator.validate(&chicago(), &code, 1.0);
        assert!(report.valid);
        let moved = Geometry::LineString(line_string![(x: -87.6198, y: 41.8781), (x: -87.6190, y: 41.8785)]);
        let report = coordinator.validate(&moved, &code, 50.0);
        assert!(report.success);
        assert!(!report.valid);
    }

    #[test]
    fn test_batch_with_missing_geometry() {
        let coordinator = ReferenceCoordinator::new(OpenLrConfig::default());
        let closures: Vec<ClosureRecord> = (0..10)
            .map(|i| {
                let geometry = if i < 8 {
                    let dx = i as f64 * 0.01;
                    Some(Geometry::LineString(
                        line_string![(x: -87.6298 + dx, y: 41.8781), (x: -87.6290 + dx, y: 41.8785)],
                    ))
                } else {
                    None
                };
                ClosureRecord::new(i, geometry)
            })
            .collect();
        let mut store = MemoryClosureStore::new(closures.clone());
        let report = coordinator.regenerate_batch(&closures, true, &mut store);
        assert_eq!(report.total_processed, 10);
        assert_eq!(report.successful, 8);
        assert_eq!(report.failed, 2);
        assert_eq!(report.errors.len(), 2);
        assert!(report.error.is_none());
        assert!(store.get(&ClosureId(0)).unwrap().has_reference());
        assert!(!store.get(&ClosureId(9)).unwrap().has_reference());

        let stats = coordinator.statistics(&store.records());
        assert_eq!(stats.total_encoded, 8);
        assert_eq!(stats.encoding_success_rate, 80.0);
    }

    #[test]
    fn test_batch_skips_existing_unless_forced() {
        let coordinator = ReferenceCoordinator::new(OpenLrConfig::default());
        let mut closures = vec![
            ClosureRecord::new(1, Some(chicago())),
            ClosureRecord::new(2, Some(chicago())),
        ];
        closures[0].openlr_code = coordinator.on_create(&chicago());
        let mut store = MemoryClosureStore::new(closures.clone());
        let report = coordinator.regenerate_batch(&closures, false, &mut store);
        assert_eq!(report.total_processed, 1);
        assert_eq!(report.successful, 1);
    }

    #[test]
    fn test_way_provider() {
        let coordinator = ReferenceCoordinator::new(OpenLrConfig::default());
        match coordinator.fetch_way_geometry(1, None, None) {
            Err(OpenLrError::ProviderNotConfigured) => {}
            other => panic!("expected missing provider, found {other:?}"),
        }
        let way = line_string![(x: -87.6298, y: 41.8781), (x: -87.6290, y: 41.8785)];
        let coordinator = coordinator.with_way_provider(Arc::new(FixedWay(way.clone())));
        assert!(coordinator.info().way_provider_configured);
        let encoded = coordinator.encode_way(1, None, None).unwrap().unwrap();
        assert_eq!(encoded.geometry, way);
        assert!(coordinator.validate_code(encoded.reference.as_str()));
        match coordinator.encode_way(2, None, None) {
            Err(OpenLrError::WayNotFound(2)) => {}
            other => panic!("expected missing way, found {other:?}"),
        }
    }
}
