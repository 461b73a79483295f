//! Demo catalog seeding.
//!
//! Inserts the demo products used by the storefront demo environment.
//! With `--destroy` the existing catalog is wiped first, matching a fresh
//! install.

use rust_decimal::Decimal;
use tracing::info;

use mercado_api::db::{self, Stores};
use mercado_api::models::Product;
use mercado_core::Price;

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    /// Price in cents.
    price_cents: i64,
    image_url: &'static str,
    category: &'static str,
    brand: &'static str,
    count_in_stock: u32,
    /// Rating in tenths (48 = 4.8).
    rating_tenths: i64,
    num_reviews: u32,
}

const DEMO_CATALOG: &[SeedProduct] = &[
    SeedProduct {
        name: "Balón de Fútbol Profesional",
        description: "Balón de fútbol de alta calidad, tamaño reglamentario, ideal para partidos y entrenamientos.",
        price_cents: 3599,
        image_url: "/images/balon_futbol.png",
        category: "Deportes",
        brand: "Nike",
        count_in_stock: 50,
        rating_tenths: 48,
        num_reviews: 120,
    },
    SeedProduct {
        name: "Mancuernas Ajustables (Par)",
        description: "Set de mancuernas ajustables de 2.5kg a 25kg, perfectas para entrenamiento en casa o gimnasio.",
        price_cents: 12999,
        image_url: "/images/mancuernas_ajustables.png",
        category: "Deportes",
        brand: "Bowflex",
        count_in_stock: 30,
        rating_tenths: 47,
        num_reviews: 85,
    },
    SeedProduct {
        name: "Batería de Auto 12V",
        description: "Batería de arranque de 12V para automóviles, con alta durabilidad y rendimiento en diversas condiciones climáticas.",
        price_cents: 9950,
        image_url: "/images/bateria_auto.png",
        category: "Repuestos de Carro",
        brand: "ACDelco",
        count_in_stock: 25,
        rating_tenths: 45,
        num_reviews: 60,
    },
    SeedProduct {
        name: "Filtro de Aceite Sintético",
        description: "Filtro de aceite de alto rendimiento para motores, compatible con la mayoría de vehículos modernos.",
        price_cents: 1575,
        image_url: "/images/filtro_aceite.png",
        category: "Repuestos de Carro",
        brand: "Mobil 1",
        count_in_stock: 100,
        rating_tenths: 46,
        num_reviews: 95,
    },
    SeedProduct {
        name: "Set de Construcción de Robótica",
        description: "Kit avanzado para construir y programar robots, ideal para niños y adolescentes interesados en STEM.",
        price_cents: 7999,
        image_url: "/images/kit_robotica.png",
        category: "Juguetes",
        brand: "LEGO Education",
        count_in_stock: 40,
        rating_tenths: 49,
        num_reviews: 70,
    },
    SeedProduct {
        name: "Cafetera Espresso Manual",
        description: "Cafetera de espresso manual de diseño elegante, fácil de usar para los amantes del café.",
        price_cents: 5999,
        image_url: "/images/cafetera-expresso.png",
        category: "Electrodomésticos",
        brand: "Brevill",
        count_in_stock: 35,
        rating_tenths: 46,
        num_reviews: 55,
    },
    SeedProduct {
        name: "Auriculares ANC Inalámbricos",
        description: "Auriculares con cancelación activa de ruido, ideales para viajes y trabajo, con sonido premium.",
        price_cents: 14999,
        image_url: "/images/auriculares-anc.png",
        category: "Audio",
        brand: "Bose",
        count_in_stock: 20,
        rating_tenths: 47,
        num_reviews: 90,
    },
    SeedProduct {
        name: "Smartwatch Fitness Tracker",
        description: "Reloj inteligente con monitor de ritmo cardíaco, GPS y seguimiento de actividad, ideal para deportistas.",
        price_cents: 8999,
        image_url: "/images/smartwatch-fitness.png",
        category: "Electrónica",
        brand: "Fitbit",
        count_in_stock: 45,
        rating_tenths: 44,
        num_reviews: 150,
    },
    SeedProduct {
        name: "Robot Aspirador Inteligente",
        description: "Aspirador robotizado con mapeo inteligente y control por aplicación, limpia tu hogar sin esfuerzo.",
        price_cents: 29999,
        image_url: "/images/robot-aspirador.png",
        category: "Hogar Inteligente",
        brand: "iRobot",
        count_in_stock: 15,
        rating_tenths: 48,
        num_reviews: 130,
    },
    SeedProduct {
        name: "Set de Cuchillos de Cocina Profesional",
        description: "Juego de 5 cuchillos de acero inoxidable de alta calidad con bloque de madera, para chefs y amantes de la cocina.",
        price_cents: 7500,
        image_url: "/images/set-cuchillos-cocina.png",
        category: "Cocina",
        brand: "Zwilling J.A. Henckels",
        count_in_stock: 20,
        rating_tenths: 46,
        num_reviews: 75,
    },
    SeedProduct {
        name: "Laptop Gaming Ultrafina",
        description: "Laptop potente y portátil para juegos, con gráficos de última generación y pantalla de alta frecuencia de actualización.",
        price_cents: 149_999,
        image_url: "/images/laptop-gaming.png",
        category: "Computadoras",
        brand: "MSI",
        count_in_stock: 10,
        rating_tenths: 49,
        num_reviews: 115,
    },
    SeedProduct {
        name: "Dinosaurio T-Rex de Juguete Gigante",
        description: "Figura de juguete de T-Rex a escala, con sonido y movimientos realistas, para horas de diversión jurásica.",
        price_cents: 4500,
        image_url: "/images/t-rex.png",
        category: "Juguetes",
        brand: "Jurassic World",
        count_in_stock: 25,
        rating_tenths: 47,
        num_reviews: 80,
    },
];

impl SeedProduct {
    fn to_product(&self) -> Product {
        let mut product = Product::new(
            self.name.to_owned(),
            self.description.to_owned(),
            Price::new(Decimal::new(self.price_cents, 2)).unwrap_or(Price::ZERO),
            self.image_url.to_owned(),
            self.category.to_owned(),
            self.brand.to_owned(),
            self.count_in_stock,
        );
        product.rating = Decimal::new(self.rating_tenths, 1);
        product.num_reviews = self.num_reviews;
        product
    }
}

/// Load the demo catalog.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn run(destroy: bool) -> Result<(), Box<dyn std::error::Error>> {
    let database_url = super::database_url()?;

    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let stores = Stores::postgres(pool);

    if destroy {
        let existing = stores.products.find_all().await?;
        for product in &existing {
            stores.products.delete(product.id).await?;
        }
        info!(count = existing.len(), "Existing products deleted");
    }

    for seed in DEMO_CATALOG {
        let product = seed.to_product();
        stores.products.create(&product).await?;
    }

    info!(count = DEMO_CATALOG.len(), "Demo catalog loaded");
    Ok(())
}
