//! S3 adapter for [`ObjectStore`].
//!
//! Credentials come from the standard AWS provider chain (environment,
//! `~/.aws`, instance or task role); nothing here manages them.
//!
//! The SDK is async-only.  `S3Store` owns a current-thread tokio runtime and
//! blocks on every call, so the rest of the tool stays synchronous.

use std::path::Path;

use aws_config::BehaviorVersion;
use aws_sdk_s3::{Client, config::Region, error::DisplayErrorContext, primitives::ByteStream};
use tokio::{io::AsyncWriteExt, runtime::Runtime};

use super::{ObjectStore, StoreError};

pub struct S3Store {
    bucket: String,
    client: Client,
    runtime: Runtime,
}

impl S3Store {
    /// Build a client for `bucket` in `region`.
    ///
    /// No request is sent until the first operation.
    pub fn connect(bucket: &str, region: &str) -> Result<Self, StoreError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(StoreError::Runtime)?;

        let sdk_config = runtime.block_on(
            aws_config::defaults(BehaviorVersion::latest())
                .region(Region::new(region.to_owned()))
                .load(),
        );

        Ok(Self {
            bucket: bucket.to_owned(),
            client: Client::new(&sdk_config),
            runtime,
        })
    }
}

impl ObjectStore for S3Store {
    fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        self.runtime.block_on(async {
            let mut keys = Vec::new();
            let mut pages = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .into_paginator()
                .send();

            while let Some(page) = pages.next().await {
                let page = page.map_err(|e| StoreError::List {
                    bucket: self.bucket.clone(),
                    reason: DisplayErrorContext(e).to_string(),
                })?;
                keys.extend(
                    page.contents()
                        .iter()
                        .filter_map(|object| object.key().map(str::to_owned)),
                );
            }
            Ok::<_, StoreError>(keys)
        })
    }

    // TODO: switch to a multipart upload so archives larger than 5 GiB (the
    // single PutObject limit) can be stored.
    fn put_file(&self, key: &str, source: &Path) -> Result<(), StoreError> {
        self.runtime.block_on(async {
            let body = ByteStream::from_path(source)
                .await
                .map_err(|e| StoreError::Upload {
                    key: key.to_owned(),
                    reason: e.to_string(),
                })?;

            self.client
                .put_object()
                .bucket(&self.bucket)
                .key(key)
                .body(body)
                .send()
                .await
                .map_err(|e| StoreError::Upload {
                    key: key.to_owned(),
                    reason: DisplayErrorContext(e).to_string(),
                })?;
            Ok::<_, StoreError>(())
        })
    }

    fn get_file(&self, key: &str, dest: &Path) -> Result<(), StoreError> {
        self.runtime.block_on(async {
            let output = self
                .client
                .get_object()
                .bucket(&self.bucket)
                .key(key)
                .send()
                .await
                .map_err(|e| {
                    if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                        StoreError::NotFound {
                            key: key.to_owned(),
                        }
                    } else {
                        StoreError::Download {
                            key: key.to_owned(),
                            reason: DisplayErrorContext(e).to_string(),
                        }
                    }
                })?;

            let io_err = |source| StoreError::Io {
                path: dest.to_path_buf(),
                source,
            };
            let mut file = tokio::fs::File::create(dest).await.map_err(io_err)?;
            let mut body = output.body;
            while let Some(chunk) = body.try_next().await.map_err(|e| StoreError::Download {
                key: key.to_owned(),
                reason: e.to_string(),
            })? {
                file.write_all(&chunk).await.map_err(io_err)?;
            }
            file.flush().await.map_err(io_err)?;
            Ok::<_, StoreError>(())
        })
    }

    fn delete_key(&self, key: &str) -> Result<(), StoreError> {
        // S3 answers 204 for keys that do not exist, so this is idempotent.
        self.runtime.block_on(async {
            self.client
                .delete_object()
                .bucket(&self.bucket)
                .key(key)
                .send()
                .await
                .map_err(|e| StoreError::Delete {
                    key: key.to_owned(),
                    reason: DisplayErrorContext(e).to_string(),
                })?;
            Ok::<_, StoreError>(())
        })
    }
}
