use uuid::Uuid;

use crate::{Error, LociService, Result, views::ImageView};
use loci_storage::models::Image;

impl LociService {
	pub async fn get_image(&self, image_id: &str) -> Result<ImageView> {
		let image_id = crate::parse_id(image_id, "Image")?;
		let image = self
			.store
			.get_image(image_id)
			.await?
			.ok_or_else(|| Error::not_found("Image not found."))?;

		Ok(ImageView::from(image))
	}

	/// Records an externally hosted image. A URL that does not validate is skipped with a
	/// warning rather than failing the surrounding location write.
	pub(crate) async fn register_image_url(&self, raw: &str) -> Result<Option<Uuid>> {
		let url = match loci_providers::images::external_image_url(raw) {
			Ok(url) => url,
			Err(err) => {
				tracing::warn!(error = %err, "Ignoring invalid image URL.");

				return Ok(None);
			},
		};
		let image = Image {
			image_id: Uuid::new_v4(),
			hosted: false,
			path: None,
			url: Some(url.to_string()),
			uploaded_at: crate::stored_now(),
		};

		self.store.insert_image(&image).await?;

		Ok(Some(image.image_id))
	}

	pub(crate) async fn release_image(&self, image_id: Uuid) -> Result<()> {
		if !self.store.delete_image(image_id).await? {
			tracing::debug!(%image_id, "Image record was already gone.");
		}

		Ok(())
	}
}
