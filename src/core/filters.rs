use crate::models::{Project, Vendor};

/// Check if a vendor operates in the project's target country
///
/// Exact set membership: "France" never matches "Francophone Region".
#[inline]
pub fn supports_country(vendor: &Vendor, country: &str) -> bool {
    vendor.countries_supported.contains(country)
}

/// Distinct services the project needs that the vendor offers,
/// in the order the project first lists them
pub fn shared_services(project: &Project, vendor: &Vendor) -> Vec<String> {
    let mut shared: Vec<String> = Vec::new();

    for service in &project.services_needed {
        if vendor.services_offered.contains(service) && !shared.contains(service) {
            shared.push(service.clone());
        }
    }

    shared
}

/// Check if a vendor offers at least one of the project's services
#[inline]
pub fn offers_any_service(vendor: &Vendor, project: &Project) -> bool {
    project
        .services_needed
        .iter()
        .any(|service| vendor.services_offered.contains(service))
}

/// Check if a vendor is eligible to be matched against a project
///
/// Both conditions must hold: country coverage and a non-empty service overlap.
#[inline]
pub fn is_candidate(vendor: &Vendor, project: &Project) -> bool {
    supports_country(vendor, &project.country) && offers_any_service(vendor, project)
}
