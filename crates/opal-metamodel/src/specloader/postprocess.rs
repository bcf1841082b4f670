//! Stock Specification Post-Processors

use opal_core::ident::natural_name;

use crate::facets::title::TitleFacet;
use crate::progmodel::SpecificationPostProcessor;
use crate::spec::ObjectSpecification;

/// Guarantees every spec carries a title facet, even when the fallback
/// factory was filtered out of the programming model.
#[derive(Debug, Default)]
pub struct TitleFallbackPostProcessor;

impl SpecificationPostProcessor for TitleFallbackPostProcessor {
    fn name(&self) -> &'static str {
        "title-fallback"
    }

    fn post_process(&self, spec: &mut ObjectSpecification) {
        if spec.facets().get_facet::<TitleFacet>().is_none() {
            let fallback = natural_name(spec.type_key().simple_name());
            spec.facets.add_facet(TitleFacet::fallback(fallback));
        }
    }
}
