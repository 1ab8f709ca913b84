//! Page navigation.
//!
//! - [`Page::Dashboard`]: 2x3 grid of live sensor values
//! - [`Page::Dtc`]: stored trouble codes with refresh and clear
//! - [`Page::Info`]: VIN, adapter status and recent log lines

use super::ButtonId;

#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Page {
    #[default]
    Dashboard,
    Dtc,
    Info,
}

impl Page {
    pub const ALL: [Self; 3] = [Self::Dashboard, Self::Dtc, Self::Info];

    /// Next page (Dashboard -> Dtc -> Info -> Dashboard).
    #[inline]
    pub const fn next(self) -> Self {
        match self {
            Self::Dashboard => Self::Dtc,
            Self::Dtc => Self::Info,
            Self::Info => Self::Dashboard,
        }
    }

    /// Header title.
    pub const fn title(self) -> &'static str {
        match self {
            Self::Dashboard => "DASHBOARD",
            Self::Dtc => "TROUBLE CODES",
            Self::Info => "VEHICLE INFO",
        }
    }

    /// Navigation bar button that opens this page.
    pub const fn nav_button(self) -> ButtonId {
        match self {
            Self::Dashboard => ButtonId::NavDashboard,
            Self::Dtc => ButtonId::NavDtc,
            Self::Info => ButtonId::NavInfo,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_default() {
        assert_eq!(Page::default(), Page::Dashboard);
    }

    #[test]
    fn test_page_next_cycle() {
        let page = Page::Dashboard.next().next().next();
        assert_eq!(page, Page::Dashboard);
        assert_eq!(Page::Dtc.next(), Page::Info);
    }

    #[test]
    fn test_nav_button_round_trip() {
        for page in Page::ALL {
            assert_eq!(page.nav_button().target_page(), Some(page));
        }
    }
}
