//! Catalog command handlers.

use std::sync::Arc;

use storefront_core::{Pages, Product, ProductFilters, Storefront};
use tabled::Tabled;

use crate::cli::{GlobalOpts, ProductsArgs, ProductsCommand};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Slug")]
    slug: String,
}

impl From<&Product> for ProductRow {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            price: format!("{:.2}", p.price),
            slug: p.slug.clone().unwrap_or_default(),
        }
    }
}

fn print_products(global: &GlobalOpts, products: &[Product]) {
    let out = output::render_list(
        global.output,
        products,
        |p| ProductRow::from(p),
        |p| p.id.clone(),
    );
    output::print_output(&out, global.quiet);
}

/// Keep appending pages until the server reports no more, or a fetch
/// stops making progress.
async fn drain<F, Fut>(
    mut pages: Arc<Pages<Product>>,
    next: F,
) -> Result<Arc<Pages<Product>>, CliError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Option<Arc<Pages<Product>>>, CliError>>,
{
    while pages.has_more() {
        let Some(more) = next().await? else { break };
        if more.page_count() <= pages.page_count() {
            break;
        }
        pages = more;
    }
    Ok(pages)
}

pub async fn handle(
    storefront: &Storefront,
    args: ProductsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ProductsCommand::List {
            category,
            min_price,
            max_price,
            search,
            page,
            all,
        } => {
            let filters = ProductFilters {
                min_price,
                max_price,
                search,
            };

            match category {
                Some(slug) => {
                    let Some(first) = storefront.products_by_category(&slug, &filters).await? else {
                        output::hint(global, &format!("Category '{slug}' has no products"));
                        print_products(global, &[]);
                        return Ok(());
                    };
                    let pages = if all {
                        let (slug, filters) = (&slug, &filters);
                        drain(first, || async move {
                            storefront
                                .fetch_next_category_page(slug, filters)
                                .await
                                .map_err(CliError::from)
                        })
                        .await?
                    } else {
                        first
                    };
                    print_products(global, &pages.items());
                    footer(global, &pages);
                }

                None if all => {
                    let first = storefront.products_infinite(&filters).await?;
                    let filters = &filters;
                    let pages = drain(first, || async move {
                        storefront
                            .fetch_next_products_page(filters)
                            .await
                            .map(Some)
                            .map_err(CliError::from)
                    })
                    .await?;
                    print_products(global, &pages.items());
                    footer(global, &pages);
                }

                None => {
                    let result = storefront.products(&filters, page.max(1)).await?;
                    print_products(global, &result.items);
                    output::hint(
                        global,
                        &format!(
                            "Page {} of {}",
                            result.meta.current_page, result.meta.total_pages
                        ),
                    );
                }
            }
            Ok(())
        }
    }
}

fn footer(global: &GlobalOpts, pages: &Pages<Product>) {
    if let Some(last) = pages.pages().last() {
        output::hint(
            global,
            &format!(
                "Loaded {} of {} pages",
                last.meta.current_page, last.meta.total_pages
            ),
        );
    }
}
