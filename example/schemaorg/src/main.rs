use ld_bind::{Binder, Decoder, Encoder, LDError, LinkedData, Node, Type};
use tracing_subscriber::EnvFilter;

/// A schema.org restaurant listing.
#[derive(LinkedData, Debug, Default)]
struct Restaurant {
    #[ld(type = "Restaurant")]
    kind: Type,
    #[ld("@id")]
    id: String,
    name: String,
    #[ld("servesCuisine", all)]
    cuisines: Vec<String>,
    #[ld("url")]
    homepage: Option<Node>,
    #[ld("aggregateRating")]
    rating: Option<Rating>,
}

#[derive(LinkedData, Debug, Default)]
struct Rating {
    #[ld("ratingValue")]
    value: f64,
    #[ld("reviewCount")]
    reviews: i64,
}

const LISTING: &str = r#"{
  "@context": {
    "@vocab": "http://schema.org/",
    "xsd": "http://www.w3.org/2001/XMLSchema#",
    "url": {"@type": "@id"},
    "reviewCount": {"@type": "xsd:integer"}
  },
  "@id": "http://example.org/places#BrewEats",
  "@type": "Restaurant",
  "name": "Brew Eats",
  "servesCuisine": ["Burgers", "Craft beer"],
  "url": "http://breweats.example/",
  "aggregateRating": {
    "@type": "AggregateRating",
    "ratingValue": 4.5,
    "reviewCount": "212"
  }
}"#;

fn main() -> Result<(), LDError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let schema = ld_bind::context! {
        "@vocab": "http://schema.org/",
        "homepage": {"@id": "http://schema.org/url", "@type": "@id"}
    }?;

    // Field keys are resolved against the same vocabulary the document uses
    let decoder = Decoder::new().with_context(schema.clone());
    let restaurant: Restaurant = decoder.decode_str(LISTING)?;
    println!("=== Decoded ===");
    println!("{:#?}", restaurant);

    println!("\n=== Generic Node ===");
    let node: Node = ld_bind::from_str(LISTING)?;
    for (key, values) in node.props.iter() {
        println!("{} ({} value(s))", key, values.len());
    }

    println!("\n=== Encoded ===");
    let json = Encoder::new()
        .with_context(schema.clone())
        .pretty(true)
        .encode_string(&restaurant)?;
    println!("{}", json);

    // Binding under the schema yields absolute keys; written without a context
    println!("\n=== Expanded ===");
    let expanded = restaurant.to_node(&Binder::new(Some(&schema)))?;
    println!("{}", ld_bind::to_string_pretty(&expanded)?);

    Ok(())
}
