/// Declarative macro generating `EventKind`, `TypedEvent`, `ALL_EVENT_KINDS`,
/// wire-format helpers, domain groups, and catalogue registration from a
/// single source of truth.
///
/// # Sections
///
/// - **`events`**: one line per kind, `Variant => "wire" => PayloadType`,
///   optionally followed by `=> normalizer_fn` for kinds whose payload
///   placement varies on the wire.
/// - **`domain_groups`**: named boolean methods grouping kinds into domains.
macro_rules! define_events {
    (@normalizer) => {
        None::<$crate::catalogue::NormalizeFn>
    };
    (@normalizer $norm:path) => {
        Some($norm as $crate::catalogue::NormalizeFn)
    };
    (
        events {
            $(
                $(#[doc = $doc:literal])*
                $variant:ident => $wire:literal => $payload_ty:ty $(=> $norm:path)?
            ),* $(,)?
        }
        domain_groups {
            $(
                $(#[doc = $gdoc:literal])*
                $method:ident => [$($gv:ident),* $(,)?]
            ),* $(,)?
        }
    ) => {
        // ── EventKind enum ──────────────────────────────────────────

        /// Discriminator of every event kind the catalogue knows.
        ///
        /// Each variant serializes to its wire string (e.g. `"message"`).
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum EventKind {
            $(
                $(#[doc = $doc])*
                #[serde(rename = $wire)]
                $variant,
            )*
        }

        /// All event kinds in definition order.
        pub const ALL_EVENT_KINDS: [EventKind; { [$($wire,)*].len() }] = [
            $(EventKind::$variant,)*
        ];

        impl EventKind {
            /// Wire discriminator (e.g. `"reaction_added"`).
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)*
                }
            }

            /// Whether frames of this kind are rewritten before decoding.
            #[must_use]
            pub fn is_normalized(self) -> bool {
                match self {
                    $(Self::$variant => define_events!(@normalizer $($norm)?).is_some(),)*
                }
            }

            /// Payload of this kind with every field at its default, as
            /// JSON without the discriminator.
            pub fn empty_payload(self) -> serde_json::Result<serde_json::Value> {
                match self {
                    $(Self::$variant => serde_json::to_value(<$payload_ty>::default()),)*
                }
            }

            $(
                $(#[doc = $gdoc])*
                #[must_use]
                pub fn $method(self) -> bool {
                    matches!(self, $(Self::$gv)|*)
                }
            )*
        }

        impl std::fmt::Display for EventKind {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for EventKind {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Self::$variant),)*
                    _ => Err(format!("unknown event kind: {s}")),
                }
            }
        }

        // ── TypedEvent enum ─────────────────────────────────────────

        /// A decoded frame: one variant per catalogue kind plus the
        /// fallback for discriminators the catalogue does not know.
        #[derive(Clone, Debug, PartialEq)]
        pub enum TypedEvent {
            $(
                $(#[doc = $doc])*
                $variant($payload_ty),
            )*
            /// Discriminator not in the catalogue; the raw document is kept.
            Unrecognized(UnrecognizedEvent),
        }

        impl TypedEvent {
            /// Catalogue kind, or `None` for the fallback.
            #[must_use]
            pub fn kind(&self) -> Option<EventKind> {
                match self {
                    $(Self::$variant(_) => Some(EventKind::$variant),)*
                    Self::Unrecognized(_) => None,
                }
            }

            /// Wire discriminator, including the one carried by the fallback.
            #[must_use]
            pub fn discriminator(&self) -> &str {
                match self {
                    $(Self::$variant(_) => $wire,)*
                    Self::Unrecognized(e) => &e.event_type,
                }
            }

            /// Payload as JSON without the discriminator. The fallback yields
            /// its raw document.
            pub fn payload_json(&self) -> serde_json::Result<serde_json::Value> {
                match self {
                    $(Self::$variant(payload) => serde_json::to_value(payload),)*
                    Self::Unrecognized(e) => Ok(e.raw.clone()),
                }
            }
        }

        // ── Catalogue registration ──────────────────────────────────

        /// Register every generated kind.
        #[allow(clippy::too_many_lines)]
        pub(crate) fn register_all(builder: &mut $crate::catalogue::CatalogueBuilder) {
            $(
                let _ = builder.register(
                    $wire,
                    $crate::catalogue::CatalogueEntry {
                        kind: EventKind::$variant,
                        decode: |doc| Ok(TypedEvent::$variant(<$payload_ty>::deserialize(doc)?)),
                        normalize: define_events!(@normalizer $($norm)?),
                    },
                );
            )*
        }
    };
}
