//! [`Listing`] definitions.

use std::sync::LazyLock;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Vehicle listing offered for sale or rent.
#[derive(Clone, Debug)]
pub struct Listing {
    /// ID of this [`Listing`].
    pub id: Id,

    /// URL-safe [`Slug`] of this [`Listing`].
    pub slug: Slug,

    /// Display [`Name`] of this [`Listing`].
    pub name: Name,

    /// [`Model`] of the vehicle.
    pub model: Model,

    /// [`Company`] (make) of the vehicle.
    pub company: Company,

    /// [`Price`] of this [`Listing`] in the smallest currency unit.
    pub price: Price,

    /// [`FuelType`] powering the vehicle.
    pub fuel_type: FuelType,

    /// [`VehicleType`] category of the vehicle.
    pub vehicle_type: VehicleType,

    /// [`Transmission`] of the vehicle, if known.
    pub transmission: Option<Transmission>,

    /// [`Drive`] type of the vehicle, if known.
    pub drive: Option<Drive>,

    /// [`Ownership`] history of the vehicle.
    pub ownership: Ownership,

    /// Exterior color of the vehicle, if known.
    pub exterior_color: Option<ExteriorColor>,

    /// Number of doors, if known.
    pub door: Option<DoorCount>,

    /// Number of seats, if known.
    pub seating_capacity: Option<SeatingCapacity>,

    /// Number of airbags, if known.
    pub airbags: Option<AirbagCount>,

    /// Engine power description (e.g. `150 bhp`), if known.
    pub power: Option<Power>,

    /// Engine torque description (e.g. `250 Nm`), if known.
    pub torque: Option<Torque>,

    /// Ground clearance description (e.g. `180 mm`), if known.
    pub ground_clearance: Option<GroundClearance>,

    /// Entertainment system description, if known.
    pub entertainment: Option<Entertainment>,

    /// Free-text description of the vehicle, if any.
    pub description: Option<Description>,

    /// Ordered list of feature descriptions.
    pub features: Vec<Feature>,

    /// Year the vehicle was registered.
    pub registered_year: RegisteredYear,

    /// Year the vehicle was manufactured, if known.
    pub manufacturing_year: Option<ManufacturingYear>,

    /// Odometer reading of the vehicle.
    pub kilometers: Kilometers,

    /// [`RegisteredState`] code the vehicle is registered in.
    pub registered_state: RegisteredState,

    /// Ordered list of image URLs (the first one is the primary thumbnail).
    pub images: Vec<ImageUrl>,

    /// Indicator whether this [`Listing`] is promoted to the homepage
    /// carousel.
    pub featured: bool,

    /// Indicator whether this [`Listing`] is offered for rent.
    pub is_for_rent: bool,

    /// [`DateTime`] when this [`Listing`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Listing`] was updated last time.
    pub updated_at: UpdateDateTime,
}

/// ID of a [`Listing`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// URL-safe unique identifier of a [`Listing`], used in storefront URLs.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Slug(String);

impl Slug {
    /// Derives the base [`Slug`] for a [`Listing`] out of its [`Name`],
    /// [`Model`] and [`RegisteredYear`].
    ///
    /// The result is the lowercased `name-model-year` concatenation with
    /// everything outside `[a-z0-9\s-]` stripped, whitespace runs replaced
    /// with single hyphens, and consecutive hyphens collapsed. A [`Model`]
    /// already appearing in the [`Name`] as a whole token (listings are
    /// commonly named `<company> <model> <trim>`) is not repeated.
    #[must_use]
    pub fn derive(name: &Name, model: &Model, year: RegisteredYear) -> Self {
        /// Characters a [`Slug`] never contains.
        static DISALLOWED: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"[^a-z0-9\s-]").expect("valid regex")
        });
        /// Whitespace runs to be replaced with a single hyphen.
        static WHITESPACE: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
        /// Consecutive hyphens to be collapsed.
        static HYPHENS: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"-+").expect("valid regex"));

        let normalize = |s: &str| {
            let s = s.to_lowercase();
            let s = DISALLOWED.replace_all(&s, "");
            let s = WHITESPACE.replace_all(&s, "-");
            HYPHENS.replace_all(&s, "-").trim_matches('-').to_owned()
        };

        let name = normalize(name.as_ref());
        let model = normalize(model.as_ref());
        let repeats_model = name == model
            || name.starts_with(&format!("{model}-"))
            || name.ends_with(&format!("-{model}"))
            || name.contains(&format!("-{model}-"));
        Self(if repeats_model {
            format!("{name}-{year}")
        } else {
            format!("{name}-{model}-{year}")
        })
    }

    /// Returns this [`Slug`] with the provided collision `counter` appended.
    #[must_use]
    pub fn with_suffix(&self, counter: u32) -> Self {
        Self(format!("{}_{counter}", self.0))
    }

    /// Creates a new [`Slug`] if the given `slug` is valid.
    #[must_use]
    pub fn new(slug: impl Into<String>) -> Option<Self> {
        let slug = slug.into();
        Self::check(&slug).then_some(Self(slug))
    }

    /// Checks whether the given `slug` is a valid [`Slug`].
    fn check(slug: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Slug`] invariants:
        /// - Must not be empty;
        /// - Must contain only lowercase alphanumerics, hyphens and
        ///   underscores.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[a-z0-9_-]+$").expect("valid regex")
        });

        let slug = slug.as_ref();
        slug.len() <= 512 && REGEX.is_match(slug)
    }
}

impl FromStr for Slug {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Slug`")
    }
}

/// Display name of a [`Listing`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Model of a [`Listing`]'s vehicle.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Model(String);

impl Model {
    /// Creates a new [`Model`] if the given `model` is valid.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Option<Self> {
        let model = model.into();
        Self::check(&model).then_some(Self(model))
    }

    /// Checks whether the given `model` is a valid [`Model`].
    fn check(model: impl AsRef<str>) -> bool {
        let model = model.as_ref();
        model.trim() == model && !model.is_empty() && model.len() <= 512
    }
}

impl FromStr for Model {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Model`")
    }
}

/// Company (make) of a [`Listing`]'s vehicle.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Company(String);

impl Company {
    /// Creates a new [`Company`] if the given `company` is valid.
    #[must_use]
    pub fn new(company: impl Into<String>) -> Option<Self> {
        let company = company.into();
        Self::check(&company).then_some(Self(company))
    }

    /// Checks whether the given `company` is a valid [`Company`].
    fn check(company: impl AsRef<str>) -> bool {
        let company = company.as_ref();
        company.trim() == company
            && !company.is_empty()
            && company.len() <= 512
    }
}

impl FromStr for Company {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Company`")
    }
}

/// State/region code a [`Listing`]'s vehicle is registered in.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct RegisteredState(String);

impl RegisteredState {
    /// Creates a new [`RegisteredState`] if the given `state` is valid.
    #[must_use]
    pub fn new(state: impl Into<String>) -> Option<Self> {
        let state = state.into();
        Self::check(&state).then_some(Self(state))
    }

    /// Checks whether the given `state` is a valid [`RegisteredState`].
    fn check(state: impl AsRef<str>) -> bool {
        let state = state.as_ref();
        state.trim() == state && !state.is_empty() && state.len() <= 64
    }
}

impl FromStr for RegisteredState {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `RegisteredState`")
    }
}

/// URL of an image owned by a [`Listing`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct ImageUrl(String);

impl ImageUrl {
    /// Creates a new [`ImageUrl`] if the given `url` is valid.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Option<Self> {
        let url = url.into();
        Self::check(&url).then_some(Self(url))
    }

    /// Checks whether the given `url` is a valid [`ImageUrl`].
    fn check(url: impl AsRef<str>) -> bool {
        let url = url.as_ref();
        url.trim() == url && !url.is_empty() && url.len() <= 2048
    }
}

impl FromStr for ImageUrl {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `ImageUrl`")
    }
}

/// Price of a [`Listing`] in the smallest currency unit.
pub type Price = u64;

/// Year a [`Listing`]'s vehicle was registered.
pub type RegisteredYear = u16;

/// Year a [`Listing`]'s vehicle was manufactured.
pub type ManufacturingYear = u16;

/// Odometer reading of a [`Listing`]'s vehicle, in kilometers.
pub type Kilometers = u32;

/// Number of doors of a [`Listing`]'s vehicle.
pub type DoorCount = u8;

/// Number of seats of a [`Listing`]'s vehicle.
pub type SeatingCapacity = u8;

/// Number of airbags of a [`Listing`]'s vehicle.
pub type AirbagCount = u8;

/// Exterior color of a [`Listing`]'s vehicle.
pub type ExteriorColor = String;

/// Engine power description of a [`Listing`]'s vehicle.
pub type Power = String;

/// Engine torque description of a [`Listing`]'s vehicle.
pub type Torque = String;

/// Ground clearance description of a [`Listing`]'s vehicle.
pub type GroundClearance = String;

/// Entertainment system description of a [`Listing`]'s vehicle.
pub type Entertainment = String;

/// Free-text description of a [`Listing`].
pub type Description = String;

/// Single feature description of a [`Listing`].
pub type Feature = String;

define_kind! {
    #[doc = "Fuel powering a [`Listing`]'s vehicle."]
    enum FuelType {
        #[doc = "Petrol engine."]
        #[label = "Petrol"]
        Petrol = 1,

        #[doc = "Diesel engine."]
        #[label = "Diesel"]
        Diesel = 2,

        #[doc = "Battery electric vehicle."]
        #[label = "Electric"]
        Electric = 3,

        #[doc = "Hybrid powertrain."]
        #[label = "Hybrid"]
        Hybrid = 4,

        #[doc = "Compressed natural gas."]
        #[label = "CNG"]
        Cng = 5,

        #[doc = "Liquefied petroleum gas."]
        #[label = "LPG"]
        Lpg = 6,
    }
}

define_kind! {
    #[doc = "Category of a [`Listing`]'s vehicle."]
    enum VehicleType {
        #[doc = "Sedan."]
        #[label = "Sedan"]
        Sedan = 1,

        #[doc = "Sport utility vehicle."]
        #[label = "SUV"]
        Suv = 2,

        #[doc = "Hatchback."]
        #[label = "Hatchback"]
        Hatchback = 3,

        #[doc = "Multi utility vehicle."]
        #[label = "MUV"]
        Muv = 4,

        #[doc = "Luxury vehicle."]
        #[label = "Luxury"]
        Luxury = 5,

        #[doc = "Convertible."]
        #[label = "Convertible"]
        Convertible = 6,

        #[doc = "Coupe."]
        #[label = "Coupe"]
        Coupe = 7,

        #[doc = "Wagon."]
        #[label = "Wagon"]
        Wagon = 8,

        #[doc = "Van."]
        #[label = "Van"]
        Van = 9,

        #[doc = "Jeep."]
        #[label = "Jeep"]
        Jeep = 10,
    }
}

define_kind! {
    #[doc = "Transmission of a [`Listing`]'s vehicle."]
    enum Transmission {
        #[doc = "Manual transmission."]
        #[label = "Manual"]
        Manual = 1,

        #[doc = "Automatic transmission."]
        #[label = "Automatic"]
        Automatic = 2,
    }
}

define_kind! {
    #[doc = "Drive type of a [`Listing`]'s vehicle."]
    enum Drive {
        #[doc = "Front-wheel drive."]
        #[label = "FWD"]
        Fwd = 1,

        #[doc = "Rear-wheel drive."]
        #[label = "RWD"]
        Rwd = 2,

        #[doc = "All-wheel drive."]
        #[label = "AWD"]
        Awd = 3,

        #[doc = "Four-wheel drive."]
        #[label = "4WD"]
        FourWd = 4,
    }
}

define_kind! {
    #[doc = "Ownership history of a [`Listing`]'s vehicle."]
    enum Ownership {
        #[doc = "First owner."]
        #[label = "1st Owner"]
        First = 1,

        #[doc = "Second owner."]
        #[label = "2nd Owner"]
        Second = 2,

        #[doc = "Third owner."]
        #[label = "3rd Owner"]
        Third = 3,

        #[doc = "Fourth or later owner."]
        #[label = "4th Owner or more"]
        FourthOrMore = 4,
    }
}

/// [`DateTime`] when a [`Listing`] was created.
pub type CreationDateTime = DateTimeOf<(Listing, unit::Creation)>;

/// [`DateTime`] when a [`Listing`] was updated last time.
pub type UpdateDateTime = DateTimeOf<(Listing, unit::Update)>;

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use super::{FuelType, ImageUrl, Model, Name, Ownership, Slug};

    fn name(s: &str) -> Name {
        Name::new(s).unwrap()
    }

    fn model(s: &str) -> Model {
        Model::new(s).unwrap()
    }

    #[test]
    fn derives_base_slug() {
        assert_eq!(
            Slug::derive(&name("BMW"), &model("X5"), 2020).to_string(),
            "bmw-x5-2020",
        );
        assert_eq!(
            Slug::derive(&name("Mercedes-Benz"), &model("C-Class"), 2019)
                .to_string(),
            "mercedes-benz-c-class-2019",
        );
    }

    #[test]
    fn derivation_is_deterministic() {
        let a = Slug::derive(&name("Audi A6"), &model("A6"), 2022);
        let b = Slug::derive(&name("Audi A6"), &model("A6"), 2022);
        assert_eq!(a, b);
    }

    #[test]
    fn does_not_repeat_model_trailing_the_name() {
        assert_eq!(
            Slug::derive(&name("BMW X5"), &model("X5"), 2021).to_string(),
            "bmw-x5-2021",
        );
    }

    #[test]
    fn strips_disallowed_characters() {
        assert_eq!(
            Slug::derive(&name("Skoda Octavia 1.8 (TSI)"), &model("Octavia"), 2018)
                .to_string(),
            "skoda-octavia-18-tsi-2018",
        );
    }

    #[test]
    fn collapses_whitespace_and_hyphens() {
        assert_eq!(
            Slug::derive(&name("Land  Rover --  Defender"), &model("110"), 2023)
                .to_string(),
            "land-rover-defender-110-2023",
        );
    }

    #[test]
    fn appends_collision_suffix() {
        let base = Slug::derive(&name("BMW"), &model("X5"), 2020);
        assert_eq!(base.with_suffix(1).to_string(), "bmw-x5-2020_1");
        assert_eq!(base.with_suffix(2).to_string(), "bmw-x5-2020_2");
    }

    #[test]
    fn validates_slug_format() {
        assert!(Slug::new("bmw-x5-2020_1").is_some());
        assert!(Slug::new("").is_none());
        assert!(Slug::new("BMW-X5").is_none());
        assert!(Slug::new("bmw x5").is_none());
    }

    #[test]
    fn parses_kind_labels() {
        assert_eq!(FuelType::from_str("Petrol").unwrap(), FuelType::Petrol);
        assert_eq!(FuelType::Cng.to_string(), "CNG");
        assert_eq!(
            Ownership::from_str("1st Owner").unwrap(),
            Ownership::First,
        );
        assert_eq!(Ownership::FourthOrMore.to_string(), "4th Owner or more");
        assert!(FuelType::from_str("Steam").is_err());
    }

    #[test]
    fn validates_image_url() {
        assert!(ImageUrl::new("https://example.com/a.jpg").is_some());
        assert!(ImageUrl::new("").is_none());
        assert!(ImageUrl::new(" padded ").is_none());
    }
}
