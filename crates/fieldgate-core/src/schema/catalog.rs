use crate::schema::ResourceSchema;
use std::sync::LazyLock;

///
/// Catalog
///
/// Resource schemas of the identity backend.
///

/// Natural account holders.
pub static USER: LazyLock<ResourceSchema> = LazyLock::new(|| {
    ResourceSchema::new(
        "user",
        &[
            "_id",
            "username",
            "email",
            "firstName",
            "lastName",
            "phoneNumber",
            "address",
            "roles",
            "isVerified",
            "createdAt",
            "updatedAt",
        ],
        &[
            "username",
            "email",
            "firstName",
            "lastName",
            "phoneNumber",
            "address",
            "password",
            "roles",
            "isVerified",
            "updatedAt",
        ],
        &[
            "_id",
            "permissions",
            "password",
            "roles",
            "isVerified",
            "createdAt",
        ],
    )
});

/// Third-party integrations acting under delegated consent.
pub static CLIENT: LazyLock<ResourceSchema> = LazyLock::new(|| {
    ResourceSchema::new(
        "client",
        &[
            "_id",
            "name",
            "description",
            "redirectUris",
            "scopes",
            "isTrusted",
            "ownerId",
            "createdAt",
            "updatedAt",
        ],
        &[
            "name",
            "description",
            "redirectUris",
            "scopes",
            "secret",
            "isTrusted",
            "updatedAt",
        ],
        &[
            "_id",
            "permissions",
            "secret",
            "ownerId",
            "isTrusted",
            "createdAt",
        ],
    )
});

/// Look a built-in schema up by resource name.
#[must_use]
pub fn by_name(name: &str) -> Option<&'static ResourceSchema> {
    [&*USER, &*CLIENT].into_iter().find(|s| s.name == name)
}

///
/// TESTS
///
