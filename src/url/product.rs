use crate::crawler::FreshnessTokens;
use crate::{UrlError, UrlResult};
use url::Url;

/// Builds the URL of one page of a category's product listing
///
/// The freshness tokens become path segments and the paging parameters
/// become query pairs:
///
/// `<base>/webapi/<magicStamp>/<timeslot>/<magic1>/<magic2>/Products/GetByProductGroupId?sortorder=<order>&pageSize=<pageSize>&productGroupId=<id>&pageIndex=<n>`
///
/// # Examples
///
/// ```
/// use nemlig_catalog::crawler::FreshnessTokens;
/// use nemlig_catalog::url::product_page_url;
///
/// let mut tokens = FreshnessTokens::empty(100, "navn");
/// tokens.magic_stamp = "ts1".to_string();
/// tokens.timeslot = "slot1".to_string();
///
/// let url = product_page_url("https://www.nemlig.com", &tokens, "42", 0).unwrap();
/// assert_eq!(
///     url.as_str(),
///     "https://www.nemlig.com/webapi/ts1/slot1/1/0/Products/GetByProductGroupId?sortorder=navn&pageSize=100&productGroupId=42&pageIndex=0"
/// );
/// ```
pub fn product_page_url(
    base_url: &str,
    tokens: &FreshnessTokens,
    product_group_id: &str,
    page_index: u32,
) -> UrlResult<Url> {
    let mut url = Url::parse(base_url)?;

    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| UrlError::CannotBeABase(base_url.to_string()))?;
        segments.pop_if_empty().extend([
            "webapi",
            tokens.magic_stamp.as_str(),
            tokens.timeslot.as_str(),
            tokens.magic1.as_str(),
            tokens.magic2.as_str(),
            "Products",
            "GetByProductGroupId",
        ]);
    }

    url.query_pairs_mut()
        .append_pair("sortorder", &tokens.order)
        .append_pair("pageSize", &tokens.page_size.to_string())
        .append_pair("productGroupId", product_group_id)
        .append_pair("pageIndex", &page_index.to_string());

    Ok(url)
}
