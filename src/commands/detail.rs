use super::AppContext;
use crate::services::feed_service::ViewLayout;
use crate::utils::errors::AppError;

/// One-shot: the detail region is rendered either way, the exit status tells which
pub async fn execute(ctx: &AppContext, id: &str) -> Result<(), AppError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(AppError::Usage("transaction id must not be empty".to_string()));
    }

    ctx.feed(ViewLayout::transactions()).show_detail(id).await?;
    Ok(())
}
