use std::fmt;

use diesel::prelude::*;
use postgis_diesel::types::{MultiPoint, Point};

use crate::schema::restaurants;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = restaurants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    pub qualifications: i32,
    pub owner: String,
    pub ppoly: MultiPoint<Point>,
}

impl fmt::Display for Restaurant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = restaurants)]
pub struct NewRestaurant {
    pub name: String,
    pub qualifications: i32,
    pub owner: String,
    pub ppoly: MultiPoint<Point>,
}

/// Column updates for an existing restaurant. `None` leaves the column as is.
#[derive(AsChangeset, Debug, Clone, Default, PartialEq)]
#[diesel(table_name = restaurants)]
pub struct RestaurantChangeset {
    pub name: Option<String>,
    pub qualifications: Option<i32>,
    pub owner: Option<String>,
    pub ppoly: Option<MultiPoint<Point>>,
}

impl RestaurantChangeset {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.qualifications.is_none()
            && self.owner.is_none()
            && self.ppoly.is_none()
    }

    /// Returns the insertable form when every column is set.
    pub fn into_new(self) -> Option<NewRestaurant> {
        Some(NewRestaurant {
            name: self.name?,
            qualifications: self.qualifications?,
            owner: self.owner?,
            ppoly: self.ppoly?,
        })
    }

    pub fn apply_to(self, restaurant: &mut Restaurant) {
        if let Some(name) = self.name {
            restaurant.name = name;
        }
        if let Some(qualifications) = self.qualifications {
            restaurant.qualifications = qualifications;
        }
        if let Some(owner) = self.owner {
            restaurant.owner = owner;
        }
        if let Some(ppoly) = self.ppoly {
            restaurant.ppoly = ppoly;
        }
    }
}
