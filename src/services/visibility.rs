//! Who may see what. Pure predicates over already-loaded entities.

use crate::models::{actor::Actor, job_listing::JobListing, profile::Profile};

pub fn is_profile_visible_to_churches(profile: &Profile) -> bool {
    profile.is_approved()
}

pub fn is_listing_visible_to_candidates(listing: &JobListing) -> bool {
    listing.is_approved()
}

/// Approved candidates disclose contact details to every church browsing
/// the pool. Mutual interest is not required.
pub fn can_church_see_contact_info(profile: &Profile) -> bool {
    profile.is_approved()
}

pub fn can_manage_profile(actor: &Actor, profile: &Profile) -> bool {
    actor.is_admin() || actor.owns_profile(profile)
}

pub fn can_manage_listing(actor: &Actor, listing: &JobListing) -> bool {
    actor.is_admin() || actor.owns_job_listing(listing)
}
