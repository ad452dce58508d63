//! [`Listing`]-related read definitions.

use std::{collections::HashMap, str::FromStr};

use derive_more::{Deref, From, Into};

use crate::domain::{
    listing::{Company, FuelType, Price, VehicleType},
    Listing,
};

/// Filter over the [`Listing`] collection.
///
/// Active fields are compiled into an ordered conjunction of predicates.
/// Results always come ordered by creation time, newest first.
#[derive(Clone, Debug, Default)]
pub struct Filter {
    /// Exact-match on the [`Company`] of a [`Listing`].
    pub company: Option<Company>,

    /// Exact-match on the [`FuelType`] of a [`Listing`].
    pub fuel_type: Option<FuelType>,

    /// Exact-match on the [`VehicleType`] of a [`Listing`].
    pub vehicle_type: Option<VehicleType>,

    /// Restriction on the `featured` flag of a [`Listing`].
    pub featured: Option<bool>,

    /// Restriction on the `isForRent` flag of a [`Listing`].
    pub for_rent: Option<bool>,

    /// Lower [`Price`] bound (inclusive).
    pub price_min: Option<Price>,

    /// Upper [`Price`] bound (inclusive).
    pub price_max: Option<Price>,

    /// Maximum number of [`Listing`]s to return.
    pub limit: Option<u32>,
}

impl Filter {
    /// Parses a [`Filter`] out of raw query parameters.
    ///
    /// Parsing is lenient: malformed values (non-numeric `priceMin`/
    /// `priceMax`/`limit`, unrecognized kind labels) and unknown keys are
    /// ignored rather than rejected. `featured` constrains only on the
    /// literal `"true"`.
    #[must_use]
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        Self {
            company: params
                .get("company")
                .cloned()
                .and_then(Company::new),
            fuel_type: params
                .get("fuelType")
                .and_then(|v| FuelType::from_str(v).ok()),
            vehicle_type: params
                .get("vehicleType")
                .and_then(|v| VehicleType::from_str(v).ok()),
            featured: (params.get("featured").map(String::as_str)
                == Some("true"))
            .then_some(true),
            for_rent: None,
            price_min: params
                .get("priceMin")
                .and_then(|v| v.parse().ok()),
            price_max: params
                .get("priceMax")
                .and_then(|v| v.parse().ok()),
            limit: params.get("limit").and_then(|v| v.parse().ok()),
        }
    }

    /// Returns this [`Filter`] restricted to rental [`Listing`]s only.
    ///
    /// Used by the rental endpoint, which always forces the restriction
    /// regardless of the provided query parameters.
    #[must_use]
    pub fn only_for_rent(mut self) -> Self {
        self.for_rent = Some(true);
        self
    }
}

/// Key for re-sorting an already fetched page of [`Listing`]s.
///
/// Alternate sorts are a pure client-side transformation: they are never
/// pushed down to the store, which always returns newest-first.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SortKey {
    /// Cheapest first.
    PriceAsc,

    /// Most expensive first.
    PriceDesc,

    /// Oldest registration year first.
    YearAsc,

    /// Newest registration year first.
    YearDesc,
}

impl FromStr for SortKey {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "priceAsc" => Ok(Self::PriceAsc),
            "priceDesc" => Ok(Self::PriceDesc),
            "yearAsc" => Ok(Self::YearAsc),
            "yearDesc" => Ok(Self::YearDesc),
            _ => Err("unknown `SortKey`"),
        }
    }
}

/// Re-sorts the provided page of [`Listing`]s by the given [`SortKey`].
pub fn sort(listings: &mut [Listing], key: SortKey) {
    match key {
        SortKey::PriceAsc => listings.sort_by_key(|l| l.price),
        SortKey::PriceDesc => {
            listings.sort_by_key(|l| std::cmp::Reverse(l.price));
        }
        SortKey::YearAsc => listings.sort_by_key(|l| l.registered_year),
        SortKey::YearDesc => {
            listings.sort_by_key(|l| std::cmp::Reverse(l.registered_year));
        }
    }
}

/// Total count of [`Listing`]s matching a [`Filter`].
#[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
pub struct TotalCount(i64);

/// Field of a [`Listing`] to build a facet over.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FacetField {
    /// Facet over vehicle makes.
    Company,

    /// Facet over fuel types.
    FuelType,

    /// Facet over vehicle categories.
    VehicleType,
}

/// Distinct-value-with-count summary over a [`FacetField`], used to
/// populate filter UI options.
#[derive(Clone, Debug, Default, Deref, Eq, From, Into, PartialEq)]
pub struct Facets(HashMap<String, i64>);

#[cfg(test)]
mod spec {
    use std::collections::HashMap;

    use crate::domain::listing::{Company, FuelType};

    use super::{Filter, SortKey};

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn parses_recognized_keys() {
        let filter = Filter::from_params(&params(&[
            ("company", "BMW"),
            ("fuelType", "Petrol"),
            ("vehicleType", "SUV"),
            ("featured", "true"),
            ("priceMin", "1000000"),
            ("priceMax", "4500000"),
            ("limit", "6"),
        ]));

        assert_eq!(filter.company, Company::new("BMW"));
        assert_eq!(filter.fuel_type, Some(FuelType::Petrol));
        assert_eq!(filter.featured, Some(true));
        assert_eq!(filter.for_rent, None);
        assert_eq!(filter.price_min, Some(1_000_000));
        assert_eq!(filter.price_max, Some(4_500_000));
        assert_eq!(filter.limit, Some(6));
    }

    #[test]
    fn ignores_malformed_values() {
        let filter = Filter::from_params(&params(&[
            ("priceMin", "cheap"),
            ("priceMax", "12.5e3"),
            ("limit", "-1"),
            ("fuelType", "Steam"),
        ]));

        assert_eq!(filter.price_min, None);
        assert_eq!(filter.price_max, None);
        assert_eq!(filter.limit, None);
        assert_eq!(filter.fuel_type, None);
    }

    #[test]
    fn featured_constrains_on_literal_true_only() {
        assert_eq!(
            Filter::from_params(&params(&[("featured", "true")])).featured,
            Some(true),
        );
        assert_eq!(
            Filter::from_params(&params(&[("featured", "1")])).featured,
            None,
        );
        assert_eq!(Filter::from_params(&params(&[])).featured, None);
    }

    #[test]
    fn ignores_unknown_keys() {
        let filter =
            Filter::from_params(&params(&[("color", "red"), ("page", "2")]));
        assert_eq!(filter.company, None);
        assert_eq!(filter.limit, None);
    }

    #[test]
    fn forces_rent_restriction() {
        let filter = Filter::from_params(&params(&[("company", "Audi")]))
            .only_for_rent();
        assert_eq!(filter.for_rent, Some(true));
        assert_eq!(filter.company, Company::new("Audi"));
    }

    #[test]
    fn parses_sort_keys() {
        assert_eq!("priceAsc".parse::<SortKey>(), Ok(SortKey::PriceAsc));
        assert_eq!("yearDesc".parse::<SortKey>(), Ok(SortKey::YearDesc));
        assert!("price".parse::<SortKey>().is_err());
    }
}
