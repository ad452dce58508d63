//! [`Listing`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select, Update};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{listing, Listing},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Restores a [`Listing`] out of a full `listings` table [`Row`].
fn from_row(row: &Row) -> Listing {
    Listing {
        id: row.get("id"),
        slug: row.get("slug"),
        name: row.get("name"),
        model: row.get("model"),
        company: row.get("company"),
        price: u64::try_from(row.get::<_, i64>("price"))
            .expect("`price` overflow"),
        fuel_type: row.get("fuel_type"),
        vehicle_type: row.get("vehicle_type"),
        transmission: row.get("transmission"),
        drive: row.get("drive"),
        ownership: row.get("ownership"),
        exterior_color: row.get("exterior_color"),
        door: row
            .get::<_, Option<i16>>("door")
            .map(u8::try_from)
            .transpose()
            .expect("`door` overflow"),
        seating_capacity: row
            .get::<_, Option<i16>>("seating_capacity")
            .map(u8::try_from)
            .transpose()
            .expect("`seating_capacity` overflow"),
        airbags: row
            .get::<_, Option<i16>>("airbags")
            .map(u8::try_from)
            .transpose()
            .expect("`airbags` overflow"),
        power: row.get("power"),
        torque: row.get("torque"),
        ground_clearance: row.get("ground_clearance"),
        entertainment: row.get("entertainment"),
        description: row.get("description"),
        features: row.get("features"),
        registered_year: u16::try_from(row.get::<_, i32>("registered_year"))
            .expect("`registered_year` overflow"),
        manufacturing_year: row
            .get::<_, Option<i32>>("manufacturing_year")
            .map(u16::try_from)
            .transpose()
            .expect("`manufacturing_year` overflow"),
        kilometers: u32::try_from(row.get::<_, i64>("kilometers"))
            .expect("`kilometers` overflow"),
        registered_state: row.get("registered_state"),
        images: row.get("images"),
        featured: row.get("featured"),
        is_for_rent: row.get("is_for_rent"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl<C> Database<Select<By<Option<Listing>, listing::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Listing>, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: listing::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, slug, name, model, company, price, \
                   fuel_type, vehicle_type, transmission, drive, ownership, \
                   exterior_color, door, seating_capacity, airbags, \
                   power, torque, ground_clearance, entertainment, \
                   description, features, \
                   registered_year, manufacturing_year, kilometers, \
                   registered_state, images, featured, is_for_rent, \
                   created_at, updated_at \
            FROM listings \
            WHERE id = $1::UUID \
            LIMIT 1";
        self.query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(from_row))
    }
}

impl<C> Database<Select<By<Option<Listing>, listing::Slug>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<Option<Listing>, listing::Id>>,
        Ok = Option<Listing>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Listing>, listing::Slug>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let slug: listing::Slug = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM listings \
            WHERE slug = $1::VARCHAR \
            LIMIT 1";
        let Some(row) = self
            .query_opt(SQL, &[&slug])
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        self.execute(Select(By::new(row.get::<_, listing::Id>("id"))))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Insert<Listing>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(listing): Insert<Listing>,
    ) -> Result<Self::Ok, Self::Err> {
        let (params, listing) = WriteParams::new(listing);

        // No `ON CONFLICT` clause: a `listings_slug_key` violation must
        // surface to the caller, driving slug collision resolution.
        const SQL: &str = "\
            INSERT INTO listings (\
                id, slug, name, model, company, price, \
                fuel_type, vehicle_type, transmission, drive, ownership, \
                exterior_color, door, seating_capacity, airbags, \
                power, torque, ground_clearance, entertainment, \
                description, features, \
                registered_year, manufacturing_year, kilometers, \
                registered_state, images, featured, is_for_rent, \
                created_at, updated_at \
            ) VALUES (\
                $1::UUID, $2::VARCHAR, $3::VARCHAR, $4::VARCHAR, \
                $5::VARCHAR, $6::INT8, \
                $7::INT2, $8::INT2, $9::INT2, $10::INT2, $11::INT2, \
                $12::VARCHAR, $13::INT2, $14::INT2, $15::INT2, \
                $16::VARCHAR, $17::VARCHAR, $18::VARCHAR, $19::VARCHAR, \
                $20::TEXT, $21::VARCHAR[], \
                $22::INT4, $23::INT4, $24::INT8, \
                $25::VARCHAR, $26::VARCHAR[], $27::BOOL, $28::BOOL, \
                $29::TIMESTAMPTZ, $30::TIMESTAMPTZ \
            )";
        self.exec(SQL, &params.as_sql(&listing))
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Update<Listing>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(listing): Update<Listing>,
    ) -> Result<Self::Ok, Self::Err> {
        let (params, listing) = WriteParams::new(listing);

        const SQL: &str = "\
            UPDATE listings \
            SET slug = $2::VARCHAR, \
                name = $3::VARCHAR, \
                model = $4::VARCHAR, \
                company = $5::VARCHAR, \
                price = $6::INT8, \
                fuel_type = $7::INT2, \
                vehicle_type = $8::INT2, \
                transmission = $9::INT2, \
                drive = $10::INT2, \
                ownership = $11::INT2, \
                exterior_color = $12::VARCHAR, \
                door = $13::INT2, \
                seating_capacity = $14::INT2, \
                airbags = $15::INT2, \
                power = $16::VARCHAR, \
                torque = $17::VARCHAR, \
                ground_clearance = $18::VARCHAR, \
                entertainment = $19::VARCHAR, \
                description = $20::TEXT, \
                features = $21::VARCHAR[], \
                registered_year = $22::INT4, \
                manufacturing_year = $23::INT4, \
                kilometers = $24::INT8, \
                registered_state = $25::VARCHAR, \
                images = $26::VARCHAR[], \
                featured = $27::BOOL, \
                is_for_rent = $28::BOOL, \
                created_at = $29::TIMESTAMPTZ, \
                updated_at = $30::TIMESTAMPTZ \
            WHERE id = $1::UUID";
        self.exec(SQL, &params.as_sql(&listing))
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<listing::Id>> for Postgres<C>
where
    C: Connection,
{
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(id): Delete<listing::Id>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            DELETE FROM listings \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id]).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Select<By<Vec<Listing>, read::listing::Filter>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Listing>, read::listing::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        let (conditions, limit) = FilterParams::new(&filter);

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];
        let limit_idx = limit.as_ref().map(|l| {
            ps.push(l);
            ps.len()
        });

        let sql = format!(
            "SELECT id, slug, name, model, company, price, \
                    fuel_type, vehicle_type, transmission, drive, ownership, \
                    exterior_color, door, seating_capacity, airbags, \
                    power, torque, ground_clearance, entertainment, \
                    description, features, \
                    registered_year, manufacturing_year, kilometers, \
                    registered_state, images, featured, is_for_rent, \
                    created_at, updated_at \
             FROM listings \
             WHERE true {conditions} \
             ORDER BY created_at DESC \
             {limiting}",
            conditions = conditions.sql(&mut ps),
            limiting = limit_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("LIMIT ${idx}::INT8"))
            }),
        );
        Ok(self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C>
    Database<Select<By<read::listing::TotalCount, read::listing::Filter>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::listing::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::listing::TotalCount, read::listing::Filter>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        let (conditions, _) = FilterParams::new(&filter);

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];
        let sql = format!(
            "SELECT COUNT(*)::INT8 \
             FROM listings \
             WHERE true {conditions}",
            conditions = conditions.sql(&mut ps),
        );
        self.query_opt(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.expect("always exists").get::<_, i64>(0).into())
    }
}

impl<C> Database<Select<By<read::listing::Facets, read::listing::FacetField>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::listing::Facets;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::listing::Facets, read::listing::FacetField>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        use read::listing::FacetField;

        // Avoid subtle change for SQL.
        let field: FacetField = by.into_inner();

        let column = match field {
            FacetField::Company => "company",
            FacetField::FuelType => "fuel_type",
            FacetField::VehicleType => "vehicle_type",
        };
        let sql = format!(
            "SELECT {column} AS value, COUNT(*)::INT8 AS count \
             FROM listings \
             GROUP BY {column}",
        );
        let rows = self
            .query(&sql, &[])
            .await
            .map_err(tracerr::wrap!())?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let value = match field {
                    FacetField::Company => {
                        row.get::<_, listing::Company>("value").to_string()
                    }
                    FacetField::FuelType => {
                        row.get::<_, listing::FuelType>("value").to_string()
                    }
                    FacetField::VehicleType => {
                        row.get::<_, listing::VehicleType>("value").to_string()
                    }
                };
                (value, row.get::<_, i64>("count"))
            })
            .collect::<std::collections::HashMap<_, _>>()
            .into())
    }
}

/// Borrow-friendly numeric conversions of a [`Listing`] being written.
///
/// Numeric fields are widened to their wire representations eagerly, so the
/// SQL parameter slice can borrow every value from a single place.
struct WriteParams {
    price: i64,
    door: Option<i16>,
    seating_capacity: Option<i16>,
    airbags: Option<i16>,
    registered_year: i32,
    manufacturing_year: Option<i32>,
    kilometers: i64,
}

impl WriteParams {
    /// Extracts [`WriteParams`] out of the provided [`Listing`].
    fn new(listing: Listing) -> (Self, Listing) {
        let params = Self {
            price: i64::try_from(listing.price).expect("`price` overflow"),
            door: listing.door.map(i16::from),
            seating_capacity: listing.seating_capacity.map(i16::from),
            airbags: listing.airbags.map(i16::from),
            registered_year: i32::from(listing.registered_year),
            manufacturing_year: listing.manufacturing_year.map(i32::from),
            kilometers: i64::from(listing.kilometers),
        };
        (params, listing)
    }

    /// Forms the full SQL parameter slice of the provided [`Listing`].
    fn as_sql<'p>(
        &'p self,
        listing: &'p Listing,
    ) -> [&'p (dyn ToSql + Sync); 30] {
        [
            &listing.id,
            &listing.slug,
            &listing.name,
            &listing.model,
            &listing.company,
            &self.price,
            &listing.fuel_type,
            &listing.vehicle_type,
            &listing.transmission,
            &listing.drive,
            &listing.ownership,
            &listing.exterior_color,
            &self.door,
            &self.seating_capacity,
            &self.airbags,
            &listing.power,
            &listing.torque,
            &listing.ground_clearance,
            &listing.entertainment,
            &listing.description,
            &listing.features,
            &self.registered_year,
            &self.manufacturing_year,
            &self.kilometers,
            &listing.registered_state,
            &listing.images,
            &listing.featured,
            &listing.is_for_rent,
            &listing.created_at,
            &listing.updated_at,
        ]
    }
}

/// Widened SQL parameters of a [`read::listing::Filter`].
struct FilterParams<'f> {
    company: Option<&'f listing::Company>,
    fuel_type: Option<&'f listing::FuelType>,
    vehicle_type: Option<&'f listing::VehicleType>,
    featured: Option<bool>,
    for_rent: Option<bool>,
    price_min: Option<i64>,
    price_max: Option<i64>,
}

impl<'f> FilterParams<'f> {
    /// Extracts [`FilterParams`] and the widened `LIMIT` value out of the
    /// provided [`read::listing::Filter`].
    fn new(filter: &'f read::listing::Filter) -> (Self, Option<i64>) {
        let params = Self {
            company: filter.company.as_ref(),
            fuel_type: filter.fuel_type.as_ref(),
            vehicle_type: filter.vehicle_type.as_ref(),
            featured: filter.featured,
            for_rent: filter.for_rent,
            price_min: filter
                .price_min
                .map(|p| i64::try_from(p).unwrap_or(i64::MAX)),
            price_max: filter
                .price_max
                .map(|p| i64::try_from(p).unwrap_or(i64::MAX)),
        };
        (params, filter.limit.map(i64::from))
    }

    /// Renders the `AND`-ed SQL conditions of these [`FilterParams`],
    /// pushing the involved values onto the provided parameter list.
    fn sql<'p>(&'p self, ps: &mut Vec<&'p (dyn ToSql + Sync)>) -> String {
        use std::fmt::Write as _;

        let mut out = String::new();
        let mut cond = |param: &'p (dyn ToSql + Sync), column, cast, op| {
            ps.push(param);
            let idx = ps.len();
            write!(out, "AND {column} {op} ${idx}::{cast} ")
                .expect("infallible");
        };

        if let Some(c) = self.company {
            cond(c, "company", "VARCHAR", "=");
        }
        if let Some(f) = self.fuel_type {
            cond(f, "fuel_type", "INT2", "=");
        }
        if let Some(v) = self.vehicle_type {
            cond(v, "vehicle_type", "INT2", "=");
        }
        if let Some(f) = self.featured.as_ref() {
            cond(f, "featured", "BOOL", "=");
        }
        if let Some(f) = self.for_rent.as_ref() {
            cond(f, "is_for_rent", "BOOL", "=");
        }
        if let Some(min) = self.price_min.as_ref() {
            cond(min, "price", "INT8", ">=");
        }
        if let Some(max) = self.price_max.as_ref() {
            cond(max, "price", "INT8", "<=");
        }

        out
    }
}
