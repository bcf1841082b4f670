//! Programming Model Registry
//!
//! The ordered, pluggable registry of metamodel-building contributions:
//! facet factories, metamodel validators, and specification
//! post-processors. The registry is open during single-threaded bootstrap,
//! then frozen by a one-shot [`ProgrammingModel::init`]; the frozen
//! snapshot is the deterministic pipeline used for the rest of the process
//! lifetime.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use opal_core::reflect::cache::ClassCache;

use crate::context::MetamodelContext;
use crate::facets::builtin::{
    AccessorFacetFactory, EntityFacetFactory, FallbackFacetFactory, IconFacetViaMethodFactory,
    MemberSupportFacetFactory, TitleFacetViaMethodFactory, ValueFacetFactory,
    ViewModelFacetFactory,
};
use crate::facets::factory::FacetFactory;
use crate::spec::ObjectSpecification;
use crate::specloader::postprocess::TitleFallbackPostProcessor;
use crate::specloader::validate::{MemberIdClashValidator, OrphanedSupportMethodValidator};
use crate::specloader::ValidationFailure;

/// Processing order for facet factories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FacetProcessingOrder {
    /// Defaults that later factories may replace
    Fallback,
    /// The core programming model
    Core,
    /// Convention-derived member support
    Defaults,
    /// Refinements over earlier contributions
    Refine,
    /// Late-bound contributions
    Late,
}

impl FacetProcessingOrder {
    /// All orders, in processing sequence
    pub const ALL: [Self; 5] = [
        Self::Fallback,
        Self::Core,
        Self::Defaults,
        Self::Refine,
        Self::Late,
    ];
}

/// Processing order for metamodel validators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationOrder {
    /// Before the bulk of validation
    Early,
    /// Default bucket
    Normal,
    /// After the bulk of validation
    Late,
}

impl ValidationOrder {
    /// All orders, in processing sequence
    pub const ALL: [Self; 3] = [Self::Early, Self::Normal, Self::Late];
}

/// Processing order for specification post-processors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostProcessingOrder {
    /// Before the bulk of post-processing
    Early,
    /// Default bucket
    Normal,
    /// After the bulk of post-processing
    Late,
}

impl PostProcessingOrder {
    /// All orders, in processing sequence
    pub const ALL: [Self; 3] = [Self::Early, Self::Normal, Self::Late];
}

/// Inclusion markers attached to registry entries, used by init filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Kept only for backwards compatibility
    Deprecated,
    /// Contributed by a persistence integration
    Persistence,
    /// Not yet part of the stable programming model
    Experimental,
}

/// Checks cross-cutting invariants over a built specification.
pub trait MetaModelValidator: Send + Sync {
    /// Stable validator name, used by init filters and diagnostics
    fn name(&self) -> &'static str;

    /// Append failures found in the given spec
    fn validate(
        &self,
        spec: &ObjectSpecification,
        cache: &ClassCache,
        failures: &mut Vec<ValidationFailure>,
    );
}

/// Adds late-bound facets to a built specification before it is frozen.
pub trait SpecificationPostProcessor: Send + Sync {
    /// Stable post-processor name, used by init filters and diagnostics
    fn name(&self) -> &'static str;

    /// Post-process the spec
    fn post_process(&self, spec: &mut ObjectSpecification);
}

/// A facet factory that also contributes additional registrations during
/// [`ProgrammingModel::init`]; the extra pass runs once and is not
/// recursive.
pub trait MetaModelRefiner {
    /// Register additional factories/validators/post-processors
    fn refine(&self, model: &mut ProgrammingModel);
}

/// Caller-supplied inclusion predicate applied when the registry snapshot
/// is taken.
pub trait InitFilter {
    /// Accept a facet factory by name and markers
    fn accept_factory(&self, _name: &str, _markers: &[Marker]) -> bool {
        true
    }

    /// Accept a validator by name and markers
    fn accept_validator(&self, _name: &str, _markers: &[Marker]) -> bool {
        true
    }

    /// Accept a post-processor by name and markers
    fn accept_post_processor(&self, _name: &str, _markers: &[Marker]) -> bool {
        true
    }
}

/// Filter accepting every registration.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl InitFilter for AcceptAll {}

/// Filter dropping registrations that carry any of the given markers.
#[derive(Debug, Clone, Default)]
pub struct ExcludingMarkers(pub Vec<Marker>);

impl ExcludingMarkers {
    fn accept(&self, markers: &[Marker]) -> bool {
        !markers.iter().any(|m| self.0.contains(m))
    }
}

impl InitFilter for ExcludingMarkers {
    fn accept_factory(&self, _name: &str, markers: &[Marker]) -> bool {
        self.accept(markers)
    }

    fn accept_validator(&self, _name: &str, markers: &[Marker]) -> bool {
        self.accept(markers)
    }

    fn accept_post_processor(&self, _name: &str, markers: &[Marker]) -> bool {
        self.accept(markers)
    }
}

struct Entry<T: ?Sized> {
    instance: Arc<T>,
    markers: Vec<Marker>,
}

impl<T: ?Sized> Clone for Entry<T> {
    fn clone(&self) -> Self {
        Self {
            instance: self.instance.clone(),
            markers: self.markers.clone(),
        }
    }
}

fn same_instance<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

// insertion-ordered per-bucket set: same-instance duplicates are dropped
fn put_entry<O: Eq + std::hash::Hash, T: ?Sized>(
    buckets: &mut FxHashMap<O, Vec<Entry<T>>>,
    order: O,
    instance: Arc<T>,
    markers: &[Marker],
) {
    let bucket = buckets.entry(order).or_default();
    if bucket.iter().any(|e| same_instance(&e.instance, &instance)) {
        return;
    }
    bucket.push(Entry {
        instance,
        markers: markers.to_vec(),
    });
}

struct Snapshot {
    factories: Vec<Arc<dyn FacetFactory>>,
    validators: Vec<Arc<dyn MetaModelValidator>>,
    post_processors: Vec<Arc<dyn SpecificationPostProcessor>>,
}

/// The ordered, pluggable registry of metamodel-building contributions.
///
/// State machine: open until [`ProgrammingModel::init`], closed afterwards.
/// Registration after init and snapshot access before init are fatal
/// bootstrap errors.
#[derive(Default)]
pub struct ProgrammingModel {
    factory_entries: FxHashMap<FacetProcessingOrder, Vec<Entry<dyn FacetFactory>>>,
    validator_entries: FxHashMap<ValidationOrder, Vec<Entry<dyn MetaModelValidator>>>,
    post_processor_entries: FxHashMap<PostProcessingOrder, Vec<Entry<dyn SpecificationPostProcessor>>>,
    snapshot: Option<Snapshot>,
}

impl ProgrammingModel {
    /// Create an open, empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn is_initialized(&self) -> bool {
        self.snapshot.is_some()
    }

    fn assert_not_initialized(&self) {
        assert!(
            !self.is_initialized(),
            "the programming model was already initialized, it cannot be altered"
        );
    }

    fn assert_initialized(&self) -> &Snapshot {
        self.snapshot
            .as_ref()
            .expect("the programming model was not initialized yet")
    }

    /// Register a facet factory.
    ///
    /// # Panics
    /// Panics when called after [`Self::init`].
    pub fn add_factory(
        &mut self,
        order: FacetProcessingOrder,
        instance: Arc<dyn FacetFactory>,
        markers: &[Marker],
    ) {
        self.assert_not_initialized();
        put_entry(&mut self.factory_entries, order, instance, markers);
    }

    /// Register a metamodel validator.
    ///
    /// # Panics
    /// Panics when called after [`Self::init`].
    pub fn add_validator(
        &mut self,
        order: ValidationOrder,
        instance: Arc<dyn MetaModelValidator>,
        markers: &[Marker],
    ) {
        self.assert_not_initialized();
        put_entry(&mut self.validator_entries, order, instance, markers);
    }

    /// Register a specification post-processor.
    ///
    /// # Panics
    /// Panics when called after [`Self::init`].
    pub fn add_post_processor(
        &mut self,
        order: PostProcessingOrder,
        instance: Arc<dyn SpecificationPostProcessor>,
        markers: &[Marker],
    ) {
        self.assert_not_initialized();
        put_entry(&mut self.post_processor_entries, order, instance, markers);
    }

    /// Finalize the registry; it cannot be modified afterwards.
    ///
    /// Registered factories that also act as refiners are first given one
    /// chance to register additional contributions, then the full ordered
    /// set is filtered and frozen into read-only lists.
    ///
    /// # Panics
    /// Panics when called twice.
    pub fn init(&mut self, filter: &dyn InitFilter) {
        self.assert_not_initialized();

        let initial_factories = self.snapshot_factories(filter);
        for factory in &initial_factories {
            if let Some(refiner) = factory.as_refiner() {
                refiner.refine(self);
            }
        }

        self.snapshot = Some(Snapshot {
            factories: self.snapshot_factories(filter),
            validators: self.snapshot_validators(filter),
            post_processors: self.snapshot_post_processors(filter),
        });
    }

    /// The frozen, ordered facet factories.
    ///
    /// # Panics
    /// Panics before [`Self::init`].
    pub fn factories(&self) -> &[Arc<dyn FacetFactory>] {
        &self.assert_initialized().factories
    }

    /// The frozen, ordered validators.
    ///
    /// # Panics
    /// Panics before [`Self::init`].
    pub fn validators(&self) -> &[Arc<dyn MetaModelValidator>] {
        &self.assert_initialized().validators
    }

    /// The frozen, ordered post-processors.
    ///
    /// # Panics
    /// Panics before [`Self::init`].
    pub fn post_processors(&self) -> &[Arc<dyn SpecificationPostProcessor>] {
        &self.assert_initialized().post_processors
    }

    fn snapshot_factories(&self, filter: &dyn InitFilter) -> Vec<Arc<dyn FacetFactory>> {
        let mut factories = Vec::new();
        for order in FacetProcessingOrder::ALL {
            let Some(bucket) = self.factory_entries.get(&order) else {
                continue;
            };
            for entry in bucket {
                if filter.accept_factory(entry.instance.name(), &entry.markers) {
                    factories.push(entry.instance.clone());
                }
            }
        }
        factories
    }

    fn snapshot_validators(&self, filter: &dyn InitFilter) -> Vec<Arc<dyn MetaModelValidator>> {
        let mut validators = Vec::new();
        for order in ValidationOrder::ALL {
            let Some(bucket) = self.validator_entries.get(&order) else {
                continue;
            };
            for entry in bucket {
                if filter.accept_validator(entry.instance.name(), &entry.markers) {
                    validators.push(entry.instance.clone());
                }
            }
        }
        validators
    }

    fn snapshot_post_processors(
        &self,
        filter: &dyn InitFilter,
    ) -> Vec<Arc<dyn SpecificationPostProcessor>> {
        let mut post_processors = Vec::new();
        for order in PostProcessingOrder::ALL {
            let Some(bucket) = self.post_processor_entries.get(&order) else {
                continue;
            };
            for entry in bucket {
                if filter.accept_post_processor(entry.instance.name(), &entry.markers) {
                    post_processors.push(entry.instance.clone());
                }
            }
        }
        post_processors
    }
}

impl std::fmt::Debug for ProgrammingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgrammingModel")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

/// The stock programming model: fallback facets first, then bean-sort and
/// class-level facets, then member accessors and support methods, plus the
/// default validators and post-processors.
pub fn default_programming_model(ctx: &MetamodelContext) -> ProgrammingModel {
    let mut model = ProgrammingModel::new();

    model.add_factory(
        FacetProcessingOrder::Fallback,
        Arc::new(FallbackFacetFactory),
        &[],
    );
    model.add_factory(
        FacetProcessingOrder::Core,
        Arc::new(ValueFacetFactory::new(ctx.value_semantics.clone())),
        &[],
    );
    model.add_factory(
        FacetProcessingOrder::Core,
        Arc::new(EntityFacetFactory::new(ctx.bookmark_resolver.clone())),
        &[Marker::Persistence],
    );
    model.add_factory(
        FacetProcessingOrder::Core,
        Arc::new(ViewModelFacetFactory),
        &[],
    );
    model.add_factory(
        FacetProcessingOrder::Core,
        Arc::new(TitleFacetViaMethodFactory::new(ctx.translation.clone())),
        &[],
    );
    model.add_factory(
        FacetProcessingOrder::Core,
        Arc::new(IconFacetViaMethodFactory),
        &[],
    );
    model.add_factory(
        FacetProcessingOrder::Core,
        Arc::new(AccessorFacetFactory),
        &[],
    );
    model.add_factory(
        FacetProcessingOrder::Defaults,
        Arc::new(MemberSupportFacetFactory::new(
            ctx.translation.clone(),
            ctx.config.clone(),
        )),
        &[],
    );

    model.add_validator(
        ValidationOrder::Normal,
        Arc::new(OrphanedSupportMethodValidator::new(ctx.config.clone())),
        &[],
    );
    model.add_validator(
        ValidationOrder::Normal,
        Arc::new(MemberIdClashValidator),
        &[],
    );

    model.add_post_processor(
        PostProcessingOrder::Normal,
        Arc::new(TitleFallbackPostProcessor),
        &[],
    );

    model
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facets::factory::ProcessClassContext;

    struct NoopFactory;
    impl FacetFactory for NoopFactory {
        fn name(&self) -> &'static str {
            "noop"
        }
    }

    struct RefiningFactory;
    impl FacetFactory for RefiningFactory {
        fn name(&self) -> &'static str {
            "refining"
        }
        fn as_refiner(&self) -> Option<&dyn MetaModelRefiner> {
            Some(self)
        }
        fn process_class(&self, _ctx: &mut ProcessClassContext<'_>) {}
    }
    impl MetaModelRefiner for RefiningFactory {
        fn refine(&self, model: &mut ProgrammingModel) {
            model.add_factory(FacetProcessingOrder::Late, Arc::new(NoopFactory), &[]);
        }
    }

    #[test]
    fn test_snapshot_preserves_bucket_and_insertion_order() {
        let mut model = ProgrammingModel::new();
        let late: Arc<dyn FacetFactory> = Arc::new(NoopFactory);
        let first: Arc<dyn FacetFactory> = Arc::new(NoopFactory);
        let second: Arc<dyn FacetFactory> = Arc::new(NoopFactory);
        model.add_factory(FacetProcessingOrder::Late, late.clone(), &[]);
        model.add_factory(FacetProcessingOrder::Core, first.clone(), &[]);
        model.add_factory(FacetProcessingOrder::Core, second.clone(), &[]);
        model.init(&AcceptAll);

        let snapshot = model.factories();
        assert_eq!(snapshot.len(), 3);
        assert!(same_instance(&snapshot[0], &first));
        assert!(same_instance(&snapshot[1], &second));
        assert!(same_instance(&snapshot[2], &late));
    }

    #[test]
    fn test_same_instance_is_deduplicated_within_bucket() {
        let mut model = ProgrammingModel::new();
        let factory: Arc<dyn FacetFactory> = Arc::new(NoopFactory);
        model.add_factory(FacetProcessingOrder::Core, factory.clone(), &[]);
        model.add_factory(FacetProcessingOrder::Core, factory.clone(), &[]);
        model.init(&AcceptAll);
        assert_eq!(model.factories().len(), 1);
    }

    #[test]
    #[should_panic(expected = "already initialized")]
    fn test_add_after_init_is_fatal() {
        let mut model = ProgrammingModel::new();
        model.init(&AcceptAll);
        model.add_factory(FacetProcessingOrder::Core, Arc::new(NoopFactory), &[]);
    }

    #[test]
    #[should_panic(expected = "not initialized")]
    fn test_stream_before_init_is_fatal() {
        let model = ProgrammingModel::new();
        let _ = model.factories();
    }

    #[test]
    #[should_panic(expected = "already initialized")]
    fn test_double_init_is_fatal() {
        let mut model = ProgrammingModel::new();
        model.init(&AcceptAll);
        model.init(&AcceptAll);
    }

    #[test]
    fn test_refiner_contributions_land_in_same_init() {
        let mut model = ProgrammingModel::new();
        model.add_factory(FacetProcessingOrder::Core, Arc::new(RefiningFactory), &[]);
        model.init(&AcceptAll);

        let names: Vec<&str> = model.factories().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["refining", "noop"]);
    }

    #[test]
    fn test_marker_filter_excludes_entries() {
        let mut model = ProgrammingModel::new();
        model.add_factory(FacetProcessingOrder::Core, Arc::new(NoopFactory), &[]);
        model.add_factory(
            FacetProcessingOrder::Core,
            Arc::new(RefiningFactory),
            &[Marker::Experimental],
        );
        model.init(&ExcludingMarkers(vec![Marker::Experimental]));

        let names: Vec<&str> = model.factories().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["noop"]);
    }
}
