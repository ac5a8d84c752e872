use shared::{ProductRow, ProductType};

/// Escape user-supplied text for embedding in HTML.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <link rel="stylesheet" href="/static/styles.css">
    <script src="https://unpkg.com/htmx.org@1.9.12"></script>
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape(title),
        body = body,
    )
}

/// One-line attribute description per category, matching the listing the
/// original front end rendered.
fn description(row: &ProductRow) -> String {
    match row.product_type.as_str() {
        "dvd" => format!("Size: {} MB", row.size.unwrap_or_default()),
        "book" => format!("Weight: {}KG", row.weight.unwrap_or_default()),
        "furniture" => format!(
            "Dimensions: {}x{}x{}",
            row.width.unwrap_or_default(),
            row.height.unwrap_or_default(),
            row.length.unwrap_or_default(),
        ),
        other => format!("Unknown type: {}", escape(other)),
    }
}

/// The products grid fragment, swapped in by htmx after a delete.
pub fn products_grid(rows: &[ProductRow]) -> String {
    let mut items = String::new();
    for row in rows {
        items.push_str(&format!(
            r#"        <div class="product">
            <input type="checkbox" class="delete-checkbox" name="product-id" value="{id}">
            <div>{sku}</div>
            <div>{name}</div>
            <div>${price:.2}</div>
            <div>{description}</div>
        </div>
"#,
            id = row.id,
            sku = escape(&row.sku),
            name = escape(&row.name),
            price = row.price,
            description = description(row),
        ));
    }
    format!("    <div class=\"productGrid\" id=\"product-grid\">\n{items}    </div>")
}

/// The full listing page.
pub fn products_page(rows: &[ProductRow]) -> String {
    let body = format!(
        r##"    <header>
        <h1 class="heading">Product List</h1>
        <div class="buttons">
            <a href="/add" class="btn">ADD</a>
            <button class="btn" type="submit" form="delete-form">MASS DELETE</button>
        </div>
    </header>
    <main>
    <form id="delete-form" hx-post="/delete" hx-target="#product-grid" hx-swap="outerHTML">
{grid}
    </form>
    </main>"##,
        grid = products_grid(rows),
    );
    layout("Product List", &body)
}

/// The add-product page. Changing the category select swaps the matching
/// variant sub-form in via htmx.
pub fn add_page() -> String {
    let body = format!(
        r##"    <header>
        <h1 class="heading">Product Add</h1>
        <div class="buttons">
            <button class="btn" type="submit" form="product-form">Save</button>
            <a href="/" class="btn">Cancel</a>
        </div>
    </header>
    <main>
    <form id="product-form" hx-post="/add">
        <label>SKU <input type="text" name="sku" required></label>
        <label>Name <input type="text" name="name" required></label>
        <label>Price ($) <input type="number" name="price" step="any" required></label>
        <label>Type
            <select name="type" hx-get="/templates/form" hx-target="#variant-form" hx-trigger="change">
                <option value="book">Book</option>
                <option value="dvd">DVD</option>
                <option value="furniture">Furniture</option>
            </select>
        </label>
        <div id="variant-form">
{fragment}
        </div>
    </form>
    </main>"##,
        fragment = variant_form(ProductType::Book),
    );
    layout("Product Add", &body)
}

/// The variant-specific sub-form fragment for `/templates/form`.
pub fn variant_form(product_type: ProductType) -> String {
    match product_type {
        ProductType::Book => r#"<p>Please provide the book's weight.</p>
<label>Weight (KG) <input type="number" name="weight" step="any" required></label>"#
            .to_string(),
        ProductType::Dvd => r#"<p>Please provide the disc's size.</p>
<label>Size (MB) <input type="number" name="size" step="any" required></label>"#
            .to_string(),
        ProductType::Furniture => r#"<p>Please provide the furniture's dimensions.</p>
<label>Width (CM) <input type="number" name="width" step="any" required></label>
<label>Length (CM) <input type="number" name="length" step="any" required></label>
<label>Height (CM) <input type="number" name="height" step="any" required></label>"#
            .to_string(),
    }
}
