/// Caller identity resolved by the auth extractor. The id is issued by the
/// external identity provider and trusted verbatim.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
}
