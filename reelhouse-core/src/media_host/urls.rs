//! Deterministic delivery URLs. Nothing here touches the network.

use reelhouse_model::ImageVariant;

/// `{delivery_base}/{asset_id}/{variant}`
pub fn build_image_url(
    delivery_base: &str,
    asset_id: &str,
    variant: ImageVariant,
) -> String {
    format!(
        "{}/{}/{}",
        delivery_base.trim_end_matches('/'),
        asset_id,
        variant.as_str()
    )
}

/// HLS manifest served from the customer playback host.
pub fn stream_manifest_url(customer_subdomain: &str, asset_id: &str) -> String {
    format!(
        "https://{}/{}/manifest/video.m3u8",
        host_only(customer_subdomain),
        asset_id
    )
}

pub fn stream_thumbnail_url(customer_subdomain: &str, asset_id: &str) -> String {
    format!(
        "https://{}/{}/thumbnails/thumbnail.jpg",
        host_only(customer_subdomain),
        asset_id
    )
}

fn host_only(subdomain: &str) -> &str {
    subdomain
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/')
}
