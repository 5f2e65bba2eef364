//! Operator commands run from the `folio-admin` binary.

use anyhow::Context as _;
use serde::Serialize;
use serde_json::Value;

use crate::cli::{AddUserArgs, ShowArgs, UploadArgs};
use crate::config::AssetHostConfig;
use crate::editor::editor_for;
use crate::identity::{IdentityProvider as _, LocalIdentityProvider};
use crate::sections::{SectionId, SectionMeta};
use crate::store::LocalFsDocumentStore;
use crate::upload::{AssetUploader, ImageFile};

#[derive(Debug, Serialize)]
struct SectionDump {
    section: SectionId,
    content: Value,
    meta: Option<SectionMeta>,
}

/// Prints a section as the console would load it, defaults included.
pub async fn show(args: ShowArgs) -> anyhow::Result<()> {
    let store = std::sync::Arc::new(LocalFsDocumentStore::new(&args.data_dir));
    let mut editor = editor_for(args.section, store);
    editor.mount().await;
    let view = editor.view();

    let dump = SectionDump {
        section: view.section,
        content: view.draft,
        meta: view.meta,
    };
    let json = serde_json::to_string_pretty(&dump).context("serialize section")?;
    println!("{json}");
    Ok(())
}

pub async fn add_user(args: AddUserArgs) -> anyhow::Result<()> {
    let provider = LocalIdentityProvider::new(&args.data_dir);
    let identity = provider
        .sign_up(&args.email, &args.password)
        .await
        .with_context(|| format!("create user {}", args.email))?;
    tracing::info!(uid = %identity.uid, "user created");
    println!("{}", identity.uid);
    Ok(())
}

pub async fn upload(args: UploadArgs) -> anyhow::Result<()> {
    let image = ImageFile::from_path(&args.file)?;
    let uploader = AssetUploader::new(reqwest::Client::new(), AssetHostConfig::from_env());
    let url = uploader
        .upload(image)
        .await
        .with_context(|| format!("upload {}", args.file.display()))?;
    println!("{url}");
    Ok(())
}
