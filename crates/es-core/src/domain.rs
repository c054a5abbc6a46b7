//! Categorical domains accepted by the quicksolver form.
//!
//! Every selectable parameter is a closed enum whose `key()` is the exact
//! option value the remote form uses. The declaration order of the variants
//! is the positional order legacy callers index into.

use core::fmt;
use core::str::FromStr;

use crate::config::ChoiceInput;
use crate::error::{CoreError, CoreResult};

/// A closed set of option values for one form field.
pub trait Categorical: Copy + Eq + Sized + 'static {
    /// The configuration field this domain belongs to.
    const FIELD: FieldKind;

    /// The full domain in positional order.
    fn all() -> &'static [Self];

    /// Option value as submitted to the form.
    fn key(&self) -> &'static str;

    /// Position of this value in [`Categorical::all`].
    fn index(&self) -> usize {
        Self::all()
            .iter()
            .position(|candidate| candidate == self)
            .unwrap_or_default()
    }

    /// Resolve a by-index lookup.
    fn from_index(index: usize) -> CoreResult<Self> {
        Self::all()
            .get(index)
            .copied()
            .ok_or_else(|| CoreError::InvalidConfig {
                field: Self::FIELD,
                value: index.to_string(),
            })
    }

    /// Resolve an exact option value.
    fn from_key(key: &str) -> CoreResult<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|candidate| candidate.key() == key)
            .ok_or_else(|| CoreError::InvalidConfig {
                field: Self::FIELD,
                value: key.to_string(),
            })
    }

    /// Resolve either input shape against this domain.
    fn resolve(input: &ChoiceInput) -> CoreResult<Self> {
        match input {
            ChoiceInput::Name(name) => Self::from_key(name),
            ChoiceInput::Index(index) => Self::from_index(*index),
        }
    }
}

macro_rules! categorical {
    (
        $(#[$meta:meta])*
        $name:ident => $kind:expr, default = $default:ident,
        [ $( $variant:ident => $key:literal ),+ $(,)? ]
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum $name {
            $(
                #[cfg_attr(feature = "serde", serde(rename = $key))]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn key(&self) -> &'static str {
                match self {
                    $($name::$variant => $key,)+
                }
            }
        }

        impl Categorical for $name {
            const FIELD: FieldKind = $kind;

            fn all() -> &'static [Self] {
                Self::ALL
            }

            fn key(&self) -> &'static str {
                $name::key(self)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$name as Categorical>::from_key(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.key())
            }
        }
    };
}

categorical! {
    /// Emitter geometry and propellant family.
    Emitter => FieldKind::Emitter, default = CapillaryIl, [
        CapillaryIl => "Capillary_IL",
        CapillaryLm => "Capillary_LM",
        ExternalConeIl => "External_Cone_IL",
        ExternalConeLm => "External_Cone_LM",
        FrameworkToyDemo => "Framework_Toy_Demo",
        PorousConeIl => "Porous_Cone_IL",
        PorousConeLm => "Porous_Cone_LM",
        PorousEdgeIl => "Porous_Edge_IL",
    ]
}

categorical! {
    /// Propellant feed system.
    Feed => FieldKind::Feed, default = CylindricalChannel, [
        CylindricalChannel => "Cylindrical_Channel",
        CylindricalExternal => "Cylindrical_External",
        CylindricalPorous => "Cylindrical_Porous",
        LowZ => "Low_Z",
        RectangularChannel => "Rectangular_Channel",
        RectangularPorous => "Rectangular_Porous",
        TaperedPorous => "Tapered_Porous",
    ]
}

categorical! {
    /// Propellant, keyed as `name,class`.
    Propellant => FieldKind::Propellant, default = EmiBf4, [
        Caesium => "Caesium,Liquid Metal",
        EmiBf4 => "EMI-BF4,Ionic Liquid",
        EmiGacl4 => "EMI-GaCl4,Ionic Liquid",
        EmiTfsi => "EMI-TFSI,Ionic Liquid",
        Gallium => "Gallium,Liquid Metal",
        Indium => "Indium,Liquid Metal",
    ]
}

categorical! {
    /// Substrate material, keyed as `material,structure`.
    ///
    /// The emitter and feed substrate selectors share this domain.
    Substrate => FieldKind::EmitterSubstrate, default = BorosilicateGlass, [
        Aluminum => "Aluminum,Channel",
        BorosilicateGlassFibermat => "Borosilicate Glass Fibermat,Porous",
        BorosilicateGlassP0 => "Borosilicate Glass P0,Porous",
        BorosilicateGlassP1 => "Borosilicate Glass P1,Porous",
        BorosilicateGlassP2 => "Borosilicate Glass P2,Porous",
        BorosilicateGlassP3 => "Borosilicate Glass P3,Porous",
        BorosilicateGlassP4 => "Borosilicate Glass P4,Porous",
        BorosilicateGlassP5 => "Borosilicate Glass P5,Porous",
        BorosilicateGlass => "Borosilicate Glass,Channel",
        Gold => "Gold,Channel",
        Platinum => "Platinum,Channel",
        Rhenium => "Rhenium,Channel",
        Silicon => "Silicon,Channel",
        StainlessSteelFibermat1 => "Stainless Steel Fibermat 1,Porous",
        TungstenPorous1 => "Tungsten Porous 1,Porous",
        TungstenPorous2 => "Tungsten Porous 2,Porous",
        Tungsten => "Tungsten,Channel",
        Xerogel1 => "Xerogel 1,Porous",
    ]
}

categorical! {
    /// Output quantity plotted by the solver.
    OutputField => FieldKind::Field, default = Thrust, [
        MeanCrOfActiveSites => "Mean CR of Active Sites",
        ElectricCurrent => "Electric Current",
        Efficiency => "Efficiency",
        MassFlow => "Mass Flow",
        Thrust => "Thrust",
        NumberOfActiveSites => "Number of Active Sites",
        Isp => "Isp",
        NumberOfSitesInIonMode => "Number of Sites In Ion Mode",
    ]
}

categorical! {
    /// Swept parameter: temperature, voltage or pressure.
    IndependentVariable => FieldKind::IndependentVariable, default = Voltage, [
        Temperature => "T",
        Voltage => "V",
        Pressure => "P",
    ]
}

/// The seven configuration fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Emitter,
    Feed,
    Propellant,
    EmitterSubstrate,
    FeedSubstrate,
    Field,
    IndependentVariable,
}

impl FieldKind {
    pub const ALL: [FieldKind; 7] = [
        FieldKind::Emitter,
        FieldKind::Feed,
        FieldKind::Propellant,
        FieldKind::EmitterSubstrate,
        FieldKind::FeedSubstrate,
        FieldKind::Field,
        FieldKind::IndependentVariable,
    ];

    /// Dropdown selections stored in every cached field snapshot, in the
    /// order they are applied to the form.
    pub const CACHED_SELECTIONS: [FieldKind; 6] = [
        FieldKind::Emitter,
        FieldKind::Feed,
        FieldKind::Propellant,
        FieldKind::EmitterSubstrate,
        FieldKind::FeedSubstrate,
        FieldKind::Field,
    ];

    /// The `name` attribute of the matching `<select>` on the form.
    pub fn form_name(&self) -> &'static str {
        match self {
            FieldKind::Emitter => "emitter",
            FieldKind::Feed => "feed",
            FieldKind::Propellant => "propellant",
            FieldKind::EmitterSubstrate => "substrate_emitter",
            FieldKind::FeedSubstrate => "substrate_feed",
            FieldKind::Field => "field",
            FieldKind::IndependentVariable => "independentVariable",
        }
    }

    pub fn from_form_name(name: &str) -> Option<FieldKind> {
        FieldKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.form_name() == name)
    }

    /// Whether a form field name belongs to a dropdown rather than a text input.
    pub fn is_selection(name: &str) -> bool {
        Self::from_form_name(name).is_some()
    }

    /// Human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::Emitter => "emitter",
            FieldKind::Feed => "feed",
            FieldKind::Propellant => "propellant",
            FieldKind::EmitterSubstrate => "emitter substrate",
            FieldKind::FeedSubstrate => "feed substrate",
            FieldKind::Field => "field",
            FieldKind::IndependentVariable => "independent variable",
        }
    }

    /// Option values for this field in positional order.
    pub fn domain(&self) -> Vec<&'static str> {
        fn keys<T: Categorical>() -> Vec<&'static str> {
            T::all().iter().map(|value| value.key()).collect()
        }

        match self {
            FieldKind::Emitter => keys::<Emitter>(),
            FieldKind::Feed => keys::<Feed>(),
            FieldKind::Propellant => keys::<Propellant>(),
            FieldKind::EmitterSubstrate | FieldKind::FeedSubstrate => keys::<Substrate>(),
            FieldKind::Field => keys::<OutputField>(),
            FieldKind::IndependentVariable => keys::<IndependentVariable>(),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FieldKind {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "emitter" => Ok(FieldKind::Emitter),
            "feed" => Ok(FieldKind::Feed),
            "propellant" => Ok(FieldKind::Propellant),
            "emitter_substrate" | "substrate_emitter" => Ok(FieldKind::EmitterSubstrate),
            "feed_substrate" | "substrate_feed" => Ok(FieldKind::FeedSubstrate),
            "field" => Ok(FieldKind::Field),
            "independent_variable" | "independentvariable" => Ok(FieldKind::IndependentVariable),
            _ => Err("unknown configuration field"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_sizes() {
        assert_eq!(Emitter::ALL.len(), 8);
        assert_eq!(Feed::ALL.len(), 7);
        assert_eq!(Propellant::ALL.len(), 6);
        assert_eq!(Substrate::ALL.len(), 18);
        assert_eq!(OutputField::ALL.len(), 8);
        assert_eq!(IndependentVariable::ALL.len(), 3);
    }

    #[test]
    fn keys_parse_back_exactly() {
        for emitter in Emitter::ALL {
            assert_eq!(emitter.key().parse::<Emitter>().unwrap(), *emitter);
        }
        for substrate in Substrate::ALL {
            assert_eq!(substrate.key().parse::<Substrate>().unwrap(), *substrate);
        }
    }

    #[test]
    fn parsing_is_exact() {
        assert!("capillary_il".parse::<Emitter>().is_err());
        assert!(" V".parse::<IndependentVariable>().is_err());
        assert!("EMI-BF4".parse::<Propellant>().is_err());
    }

    #[test]
    fn positional_order_matches_declaration() {
        assert_eq!(Emitter::from_index(0).unwrap(), Emitter::CapillaryIl);
        assert_eq!(Feed::from_index(3).unwrap(), Feed::LowZ);
        assert_eq!(IndependentVariable::from_index(2).unwrap(), IndependentVariable::Pressure);
        assert_eq!(Substrate::Xerogel1.index(), 17);
    }

    #[test]
    fn out_of_range_index_names_the_field() {
        let err = OutputField::from_index(8).unwrap_err();
        assert_eq!(err.field(), FieldKind::Field);
    }

    #[test]
    fn form_names_roundtrip() {
        for kind in FieldKind::ALL {
            assert_eq!(FieldKind::from_form_name(kind.form_name()), Some(kind));
        }
        assert!(FieldKind::is_selection("substrate_feed"));
        assert!(!FieldKind::is_selection("Voltage"));
    }

    #[test]
    fn field_kind_aliases() {
        assert_eq!(
            "emitter-substrate".parse::<FieldKind>().unwrap(),
            FieldKind::EmitterSubstrate
        );
        assert_eq!(
            "independentVariable".parse::<FieldKind>().unwrap(),
            FieldKind::IndependentVariable
        );
    }

    #[test]
    fn defaults_match_the_stock_configuration() {
        assert_eq!(Emitter::default().key(), "Capillary_IL");
        assert_eq!(Propellant::default().key(), "EMI-BF4,Ionic Liquid");
        assert_eq!(Substrate::default().key(), "Borosilicate Glass,Channel");
        assert_eq!(IndependentVariable::default().key(), "V");
    }
}
